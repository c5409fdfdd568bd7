/// Amounts offered to choose from when zapping, in sats.
pub const DEFAULT_ZAP_AMOUNTS: [u64; 5] = [21, 444, 808, 5000, 10000];

/// Zap requests and LNURL callbacks count in millisatoshis. Saturates at
/// `u64::MAX`.
pub fn sats_to_msats(sats: u64) -> u64 {
    sats.saturating_mul(1000)
}

/// Compact form of a zap total: `21`, `1.2k`, `3M`. `None` for zero.
pub fn format_zap_total(sats: u64) -> Option<String> {
    fn one_decimal(n: f64) -> String {
        let s = format!("{n:.1}");
        s.strip_suffix(".0").map(str::to_string).unwrap_or(s)
    }

    match sats {
        0 => None,
        s if s >= 1_000_000 => Some(format!("{}M", one_decimal(s as f64 / 1_000_000.0))),
        s if s >= 1_000 => Some(format!("{}k", one_decimal(s as f64 / 1_000.0))),
        s => Some(s.to_string()),
    }
}
