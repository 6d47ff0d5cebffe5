use crate::constants::{MAX_TICK_MS, MIN_TICK_MS, TICK_MS};

pub fn parse_port(raw: Option<&str>) -> u16 {
    raw.and_then(|value| value.trim().parse::<u16>().ok())
        .unwrap_or(8080)
}

pub fn normalize_tick_ms(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .map(|value| value.clamp(MIN_TICK_MS, MAX_TICK_MS))
        .unwrap_or(TICK_MS)
}

/// Seeds wider than 32 bits keep their low half.
pub fn parse_seed(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .map(|value| value as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_falls_back_on_garbage() {
        assert_eq!(parse_port(Some("9000")), 9000);
        assert_eq!(parse_port(Some(" 9001 ")), 9001);
        assert_eq!(parse_port(Some("99999")), 8080);
        assert_eq!(parse_port(Some("abc")), 8080);
        assert_eq!(parse_port(None), 8080);
    }

    #[test]
    fn tick_interval_is_clamped() {
        assert_eq!(normalize_tick_ms(None), TICK_MS);
        assert_eq!(normalize_tick_ms(Some("1")), MIN_TICK_MS);
        assert_eq!(normalize_tick_ms(Some("250")), 250);
        assert_eq!(normalize_tick_ms(Some("600000")), MAX_TICK_MS);
        assert_eq!(normalize_tick_ms(Some("-5")), TICK_MS);
    }

    #[test]
    fn seed_parsing_is_lenient() {
        assert_eq!(parse_seed(Some("42")), Some(42));
        assert_eq!(parse_seed(Some("4294967297")), Some(1));
        assert_eq!(parse_seed(Some("x")), None);
        assert_eq!(parse_seed(None), None);
    }
}
