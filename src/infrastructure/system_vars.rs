//! System variable functions (C6): `$guid`, `$timestamp`, `$datetime`,
//! `$localDatetime`, `$randomInt`, `$processEnv`, `$dotenv`.
//!
//! Failure policy: an unrecognized function name, or arguments that fail to
//! parse, returns `None` — the caller (the resolver) passes the whole
//! `{{...}}` token through unchanged rather than substituting anything.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration as ChronoDuration, Months, TimeZone, Timelike};

use crate::domain::{Clock, RandomSource};

/// The capabilities and environment snapshots a system-variable evaluation
/// needs, bundled so `resolver::resolve` doesn't have to thread four
/// separate arguments through.
pub(crate) struct SystemVarContext<'a> {
    pub clock: &'a dyn Clock,
    pub random: &'a dyn RandomSource,
    pub env_snapshot: &'a BTreeMap<String, String>,
    pub dotenv_snapshot: &'a BTreeMap<String, String>,
}

/// Evaluate a `{{...}}` payload that starts with `$`. `payload` is the
/// trimmed text between the braces, including the leading `$`.
pub(crate) fn evaluate(payload: &str, ctx: &SystemVarContext<'_>) -> Option<String> {
    let rest = payload.trim().strip_prefix('$')?;
    let mut parts = rest.splitn(2, char::is_whitespace);
    let func = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    match func.to_ascii_lowercase().as_str() {
        "guid" => Some(ctx.random.guid().to_string()),
        "timestamp" => eval_timestamp(args, ctx.clock),
        "datetime" => eval_datetime_utc(args, ctx.clock),
        "localdatetime" => eval_datetime_local(args, ctx.clock),
        "randomint" => eval_random_int(args, ctx.random),
        "processenv" => eval_env_lookup(args, ctx.env_snapshot),
        "dotenv" => eval_env_lookup(args, ctx.dotenv_snapshot),
        _ => None,
    }
}

fn eval_env_lookup(args: &str, snapshot: &BTreeMap<String, String>) -> Option<String> {
    if args.is_empty() {
        return None;
    }
    Some(snapshot.get(args).cloned().unwrap_or_default())
}

fn eval_timestamp(args: &str, clock: &dyn Clock) -> Option<String> {
    let now = clock.now_utc();
    if args.is_empty() {
        return Some(now.timestamp().to_string());
    }
    let (amount, unit) = parse_offset(args)?;
    let shifted = apply_offset(now, amount, unit)?;
    Some(shifted.timestamp().to_string())
}

fn eval_datetime_utc(args: &str, clock: &dyn Clock) -> Option<String> {
    let (format, quoted, offset_args) = split_format(args)?;
    let now = clock.now_utc();
    let shifted = if offset_args.is_empty() {
        now
    } else {
        let (amount, unit) = parse_offset(offset_args)?;
        apply_offset(now, amount, unit)?
    };
    render_format(&shifted, &format, quoted)
}

fn eval_datetime_local(args: &str, clock: &dyn Clock) -> Option<String> {
    let (format, quoted, offset_args) = split_format(args)?;
    let now = clock.now_local();
    let shifted = if offset_args.is_empty() {
        now
    } else {
        let (amount, unit) = parse_offset(offset_args)?;
        apply_offset(now, amount, unit)?
    };
    render_format(&shifted, &format, quoted)
}

fn eval_random_int(args: &str, random: &dyn RandomSource) -> Option<String> {
    let mut parts = args.split_whitespace();
    let min: i64 = parts.next()?.parse().ok()?;
    let max: i64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    if min >= max {
        return None;
    }
    Some(random.random_int(min, max).to_string())
}

/// Parse `<int> <unit>`, where unit is one of `ms|s|m|h|d|w|M|y`
/// (case-sensitive: `m` is minutes, `M` is months).
fn parse_offset(args: &str) -> Option<(i64, &str)> {
    let mut parts = args.splitn(2, char::is_whitespace);
    let amount = parts.next()?.trim().parse::<i64>().ok()?;
    let unit = parts.next()?.trim();
    if unit.is_empty() {
        return None;
    }
    Some((amount, unit))
}

fn apply_offset<Tz: TimeZone>(now: DateTime<Tz>, amount: i64, unit: &str) -> Option<DateTime<Tz>> {
    match unit {
        "ms" => Some(now + ChronoDuration::milliseconds(amount)),
        "s" => Some(now + ChronoDuration::seconds(amount)),
        "m" => Some(now + ChronoDuration::minutes(amount)),
        "h" => Some(now + ChronoDuration::hours(amount)),
        "d" => Some(now + ChronoDuration::days(amount)),
        "w" => Some(now + ChronoDuration::weeks(amount)),
        "M" => shift_months(now, amount),
        "y" => shift_months(now, amount.checked_mul(12)?),
        _ => None,
    }
}

fn shift_months<Tz: TimeZone>(now: DateTime<Tz>, months: i64) -> Option<DateTime<Tz>> {
    if months >= 0 {
        let count: u32 = months.try_into().ok()?;
        now.checked_add_months(Months::new(count))
    } else {
        let count: u32 = (-months).try_into().ok()?;
        now.checked_sub_months(Months::new(count))
    }
}

/// Split `<format> [int unit]` into the format token (unwrapping a single-
/// or double-quoted custom pattern), whether it arrived quoted, and the
/// remaining offset arguments. Only a quoted token may be treated as a
/// custom pattern; an unquoted token must name `rfc1123`/`iso8601` or the
/// whole `{{...}}` fails per spec's "unknown named format" rule.
fn split_format(args: &str) -> Option<(String, bool, &str)> {
    let args = args.trim();
    if args.is_empty() {
        return None;
    }
    if let Some(rest) = args.strip_prefix('\'') {
        let end = rest.find('\'')?;
        Some((rest[..end].to_string(), true, rest[end + 1..].trim()))
    } else if let Some(rest) = args.strip_prefix('"') {
        let end = rest.find('"')?;
        Some((rest[..end].to_string(), true, rest[end + 1..].trim()))
    } else {
        match args.find(char::is_whitespace) {
            Some(idx) => Some((args[..idx].to_string(), false, args[idx..].trim())),
            None => Some((args.to_string(), false, "")),
        }
    }
}

fn render_format<Tz: TimeZone>(dt: &DateTime<Tz>, format: &str, quoted: bool) -> Option<String>
where
    Tz::Offset: std::fmt::Display,
{
    match format {
        "" => None,
        "rfc1123" => Some(dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string()),
        "iso8601" => Some(dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()),
        custom if quoted => Some(render_custom(dt, custom)),
        _ => None,
    }
}

/// Render a custom pattern built from runs of `y`, `M`, `d`, `H`, `m`, `s`,
/// `f` (run length selects zero-padding width, or fractional-digit count for
/// `f`); every other character is copied through literally. This is the
/// REST Client convention's own token alphabet, not `chrono`'s `strftime`.
fn render_custom<Tz: TimeZone>(dt: &DateTime<Tz>, pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if "yMdHmsf".contains(c) {
            let mut j = i + 1;
            while j < chars.len() && chars[j] == c {
                j += 1;
            }
            out.push_str(&render_token(dt, c, j - i));
            i = j;
        } else {
            out.push(c);
            i += 1;
        }
    }
    out
}

fn render_token<Tz: TimeZone>(dt: &DateTime<Tz>, token: char, width: usize) -> String {
    match token {
        'y' => {
            if width >= 4 {
                format!("{:04}", dt.year())
            } else {
                format!("{:0width$}", dt.year().rem_euclid(100))
            }
        }
        'M' => format!("{:0width$}", dt.month()),
        'd' => format!("{:0width$}", dt.day()),
        'H' => format!("{:0width$}", dt.hour()),
        'm' => format!("{:0width$}", dt.minute()),
        's' => format!("{:0width$}", dt.second()),
        'f' => {
            let nanos = format!("{:09}", dt.nanosecond());
            nanos.chars().take(width).collect()
        }
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone as _, Utc};
    use uuid::Uuid;

    struct FixedClock {
        utc: DateTime<Utc>,
    }

    impl Clock for FixedClock {
        fn now_utc(&self) -> DateTime<Utc> {
            self.utc
        }

        fn now_local(&self) -> DateTime<chrono::Local> {
            self.utc.with_timezone(&Local)
        }
    }

    struct FixedRandom {
        guid: Uuid,
        value: i64,
    }

    impl RandomSource for FixedRandom {
        fn guid(&self) -> Uuid {
            self.guid
        }

        fn random_int(&self, _min: i64, _max: i64) -> i64 {
            self.value
        }
    }

    fn ctx<'a>(
        clock: &'a FixedClock,
        random: &'a FixedRandom,
        env: &'a BTreeMap<String, String>,
        dotenv: &'a BTreeMap<String, String>,
    ) -> SystemVarContext<'a> {
        SystemVarContext {
            clock,
            random,
            env_snapshot: env,
            dotenv_snapshot: dotenv,
        }
    }

    #[test]
    fn guid_returns_pinned_uuid() {
        let clock = FixedClock {
            utc: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        };
        let random = FixedRandom {
            guid: Uuid::nil(),
            value: 0,
        };
        let env = BTreeMap::new();
        let dotenv = BTreeMap::new();
        let result = evaluate("$guid", &ctx(&clock, &random, &env, &dotenv));
        assert_eq!(result, Some(Uuid::nil().to_string()));
    }

    #[test]
    fn timestamp_without_offset_matches_clock() {
        let pinned = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let clock = FixedClock { utc: pinned };
        let random = FixedRandom {
            guid: Uuid::nil(),
            value: 0,
        };
        let env = BTreeMap::new();
        let dotenv = BTreeMap::new();
        let result = evaluate("$timestamp", &ctx(&clock, &random, &env, &dotenv));
        assert_eq!(result, Some(pinned.timestamp().to_string()));
    }

    #[test]
    fn timestamp_with_day_offset_subtracts_86400_seconds() {
        let pinned = Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap();
        let clock = FixedClock { utc: pinned };
        let random = FixedRandom {
            guid: Uuid::nil(),
            value: 0,
        };
        let env = BTreeMap::new();
        let dotenv = BTreeMap::new();
        let result = evaluate("$timestamp -1 d", &ctx(&clock, &random, &env, &dotenv)).unwrap();
        let expected = pinned.timestamp() - 86400;
        assert_eq!(result.parse::<i64>().unwrap(), expected);
    }

    #[test]
    fn datetime_iso8601_matches_pattern() {
        let pinned = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        let clock = FixedClock { utc: pinned };
        let random = FixedRandom {
            guid: Uuid::nil(),
            value: 0,
        };
        let env = BTreeMap::new();
        let dotenv = BTreeMap::new();
        let result = evaluate("$datetime iso8601", &ctx(&clock, &random, &env, &dotenv)).unwrap();
        assert_eq!(result, "2026-03-04T05:06:07.000Z");
    }

    #[test]
    fn datetime_custom_pattern_renders_tokens() {
        let pinned = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        let clock = FixedClock { utc: pinned };
        let random = FixedRandom {
            guid: Uuid::nil(),
            value: 0,
        };
        let env = BTreeMap::new();
        let dotenv = BTreeMap::new();
        let result = evaluate("$datetime 'yyyy-MM-dd'", &ctx(&clock, &random, &env, &dotenv)).unwrap();
        assert_eq!(result, "2026-03-04");
    }

    #[test]
    fn datetime_unquoted_unknown_format_fails_rather_than_rendering() {
        let clock = FixedClock {
            utc: Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap(),
        };
        let random = FixedRandom {
            guid: Uuid::nil(),
            value: 0,
        };
        let env = BTreeMap::new();
        let dotenv = BTreeMap::new();
        assert_eq!(evaluate("$datetime zzz", &ctx(&clock, &random, &env, &dotenv)), None);
        assert_eq!(
            evaluate("$datetime yyyy-MM-dd", &ctx(&clock, &random, &env, &dotenv)),
            None
        );
    }

    #[test]
    fn random_int_uses_pinned_value_within_range() {
        let clock = FixedClock {
            utc: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        };
        let random = FixedRandom {
            guid: Uuid::nil(),
            value: 42,
        };
        let env = BTreeMap::new();
        let dotenv = BTreeMap::new();
        let result = evaluate("$randomInt 0 100", &ctx(&clock, &random, &env, &dotenv));
        assert_eq!(result, Some("42".to_string()));
    }

    #[test]
    fn random_int_with_min_gte_max_fails() {
        let clock = FixedClock {
            utc: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        };
        let random = FixedRandom {
            guid: Uuid::nil(),
            value: 42,
        };
        let env = BTreeMap::new();
        let dotenv = BTreeMap::new();
        assert_eq!(evaluate("$randomInt 100 100", &ctx(&clock, &random, &env, &dotenv)), None);
    }

    #[test]
    fn process_env_returns_empty_string_when_unset() {
        let clock = FixedClock {
            utc: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        };
        let random = FixedRandom {
            guid: Uuid::nil(),
            value: 0,
        };
        let env = BTreeMap::new();
        let dotenv = BTreeMap::new();
        let result = evaluate("$processEnv MISSING", &ctx(&clock, &random, &env, &dotenv));
        assert_eq!(result, Some(String::new()));
    }

    #[test]
    fn process_env_returns_value_when_present() {
        let clock = FixedClock {
            utc: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        };
        let random = FixedRandom {
            guid: Uuid::nil(),
            value: 0,
        };
        let env = BTreeMap::from([("REGION".to_string(), "us-east-1".to_string())]);
        let dotenv = BTreeMap::new();
        let result = evaluate("$processEnv REGION", &ctx(&clock, &random, &env, &dotenv));
        assert_eq!(result, Some("us-east-1".to_string()));
    }

    #[test]
    fn unknown_function_returns_none() {
        let clock = FixedClock {
            utc: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        };
        let random = FixedRandom {
            guid: Uuid::nil(),
            value: 0,
        };
        let env = BTreeMap::new();
        let dotenv = BTreeMap::new();
        assert_eq!(evaluate("$madeUpFunction", &ctx(&clock, &random, &env, &dotenv)), None);
    }
}
