use std::str::FromStr;
use std::time::Duration;

/// Durations such as `30s`, `2m` or `1m30s`. A bare number is seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanDuration(pub Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_millis = 0u64;
        let mut current_number = String::new();
        let mut chars = s.trim().chars().peekable();

        if s.trim().is_empty() {
            return Err("Duration must include a number".to_string());
        }

        while let Some(c) = chars.next() {
            if c.is_ascii_digit() {
                current_number.push(c);
                continue;
            }
            let num: u64 = current_number
                .parse()
                .map_err(|_| format!("Expected a number before '{}'", c))?;
            let unit_millis = match c {
                'm' if chars.peek() == Some(&'s') => {
                    chars.next();
                    1
                }
                's' => 1_000,
                'm' => 60_000,
                'h' => 3_600_000,
                _ => return Err(format!("Invalid duration unit: {}", c)),
            };
            total_millis = add_scaled(total_millis, num, unit_millis)?;
            current_number.clear();
        }

        if !current_number.is_empty() {
            let num: u64 = current_number
                .parse()
                .map_err(|_| "Invalid number in duration".to_string())?;
            total_millis = add_scaled(total_millis, num, 1_000)?;
        }

        if total_millis == 0 {
            return Err("Duration must be greater than zero".to_string());
        }
        Ok(HumanDuration(Duration::from_millis(total_millis)))
    }
}

fn add_scaled(total: u64, num: u64, unit_millis: u64) -> std::result::Result<u64, String> {
    num.checked_mul(unit_millis)
        .and_then(|millis| total.checked_add(millis))
        .ok_or_else(|| "Duration is too large".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_durations() {
        assert_eq!("30s".parse::<HumanDuration>().unwrap().0, Duration::from_secs(30));
        assert_eq!("45".parse::<HumanDuration>().unwrap().0, Duration::from_secs(45));
        assert_eq!("1m30s".parse::<HumanDuration>().unwrap().0, Duration::from_secs(90));
        assert_eq!("500ms".parse::<HumanDuration>().unwrap().0, Duration::from_millis(500));
        assert_eq!("1h".parse::<HumanDuration>().unwrap().0, Duration::from_secs(3600));
    }

    #[test]
    fn test_reject_bad_durations() {
        assert!("".parse::<HumanDuration>().is_err());
        assert!("0s".parse::<HumanDuration>().is_err());
        assert!("10x".parse::<HumanDuration>().is_err());
        assert!("s".parse::<HumanDuration>().is_err());
    }

    #[test]
    fn test_oversized_duration_is_an_error() {
        assert_eq!(
            "99999999999999999s".parse::<HumanDuration>().unwrap_err(),
            "Duration is too large"
        );
        assert_eq!(
            "18446744073709551615ms1ms".parse::<HumanDuration>().unwrap_err(),
            "Duration is too large"
        );
        assert!("99999999999999999999".parse::<HumanDuration>().is_err());
    }
}
