//! UTC date values.
//!
//! A date is a count of milliseconds since the Unix epoch, NaN when invalid.
//! All calendar fields are computed in UTC.

use std::sync::Arc;

use crate::{
    errors::{ErrorKind, Mutation},
    values::{HostObject, PrimitiveHint, Value},
};

/// Largest representable distance from the epoch, in milliseconds.
const MAX_TIME: f64 = 8.64e15;
const MS_PER_DAY: f64 = 86_400_000.0;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const GETTERS: &[&str] = &[
    "getTime",
    "valueOf",
    "getFullYear",
    "getMonth",
    "getDate",
    "getDay",
    "getHours",
    "getMinutes",
    "getSeconds",
    "getMilliseconds",
    "getUTCFullYear",
    "getUTCMonth",
    "getUTCDate",
    "getUTCDay",
    "getUTCHours",
    "getUTCMinutes",
    "getUTCSeconds",
    "getUTCMilliseconds",
    "getTimezoneOffset",
    "toISOString",
    "toJSON",
    "toString",
    "toUTCString",
];

const SETTERS: &[&str] = &[
    "setTime",
    "setFullYear",
    "setMonth",
    "setDate",
    "setHours",
    "setMinutes",
    "setSeconds",
    "setMilliseconds",
    "setUTCFullYear",
    "setUTCMonth",
    "setUTCDate",
    "setUTCHours",
    "setUTCMinutes",
    "setUTCSeconds",
    "setUTCMilliseconds",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateObject {
    millis: f64,
}

/// Calendar fields of a valid time value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fields {
    pub year: i64,
    /// Zero-based.
    pub month: u32,
    pub day: u32,
    pub weekday: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub millis: u32,
}

impl DateObject {
    pub fn new(millis: f64) -> Self {
        Self {
            millis: time_clip(millis),
        }
    }

    pub fn now() -> Self {
        Self::new(now_millis())
    }

    pub fn millis(&self) -> f64 {
        self.millis
    }

    pub fn is_valid(&self) -> bool {
        !self.millis.is_nan()
    }

    pub fn fields(&self) -> Option<Fields> {
        self.is_valid().then(|| fields(self.millis))
    }

    pub fn to_iso_string(&self) -> Result<String, ErrorKind> {
        let f = self
            .fields()
            .ok_or_else(|| ErrorKind::type_error("Invalid time value"))?;
        let year = if (0..=9999).contains(&f.year) {
            format!("{:04}", f.year)
        } else {
            format!("{}{:06}", if f.year < 0 { '-' } else { '+' }, f.year.abs())
        };
        Ok(format!(
            "{}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
            year,
            f.month + 1,
            f.day,
            f.hours,
            f.minutes,
            f.seconds,
            f.millis
        ))
    }

    fn display(&self) -> String {
        match self.fields() {
            None => "Invalid Date".to_string(),
            Some(f) => format!(
                "{} {} {:02} {} {:02}:{:02}:{:02} GMT+0000 (Coordinated Universal Time)",
                WEEKDAYS[f.weekday as usize],
                MONTHS[f.month as usize],
                f.day,
                format_year(f.year),
                f.hours,
                f.minutes,
                f.seconds
            ),
        }
    }

    fn utc_display(&self) -> String {
        match self.fields() {
            None => "Invalid Date".to_string(),
            Some(f) => format!(
                "{}, {:02} {} {} {:02}:{:02}:{:02} GMT",
                WEEKDAYS[f.weekday as usize],
                f.day,
                MONTHS[f.month as usize],
                format_year(f.year),
                f.hours,
                f.minutes,
                f.seconds
            ),
        }
    }

    fn field(&self, get: impl FnOnce(&Fields) -> f64) -> Value {
        Value::Number(self.fields().as_ref().map_or(f64::NAN, get))
    }
}

fn format_year(year: i64) -> String {
    if year < 0 {
        format!("-{:06}", -year)
    } else {
        format!("{:04}", year)
    }
}

impl HostObject for DateObject {
    fn kind(&self) -> &str {
        "Date"
    }

    fn get(&self, _key: &str) -> Option<Value> {
        None
    }

    fn keys(&self) -> Vec<Arc<str>> {
        Vec::new()
    }

    fn methods(&self) -> &[&'static str] {
        &DATE_METHODS
    }

    fn invoke(&self, method: &str, _args: &[Value]) -> Result<Value, ErrorKind> {
        let value = match method {
            "getTime" | "valueOf" => Value::Number(self.millis),
            "getFullYear" | "getUTCFullYear" => self.field(|f| f.year as f64),
            "getMonth" | "getUTCMonth" => self.field(|f| f64::from(f.month)),
            "getDate" | "getUTCDate" => self.field(|f| f64::from(f.day)),
            "getDay" | "getUTCDay" => self.field(|f| f64::from(f.weekday)),
            "getHours" | "getUTCHours" => self.field(|f| f64::from(f.hours)),
            "getMinutes" | "getUTCMinutes" => self.field(|f| f64::from(f.minutes)),
            "getSeconds" | "getUTCSeconds" => self.field(|f| f64::from(f.seconds)),
            "getMilliseconds" | "getUTCMilliseconds" => self.field(|f| f64::from(f.millis)),
            "getTimezoneOffset" => self.field(|_| 0.0),
            "toISOString" => Value::from(self.to_iso_string()?),
            "toJSON" => match self.to_iso_string() {
                Ok(s) => Value::from(s),
                Err(_) => Value::Null,
            },
            "toString" => Value::from(self.display()),
            "toUTCString" => Value::from(self.utc_display()),
            setter if SETTERS.contains(&setter) => {
                return Err(ErrorKind::MutationProhibited(Mutation::Call(
                    setter.to_string(),
                )));
            }
            other => {
                return Err(ErrorKind::NotAFunction {
                    callee: format!("Date.{}", other),
                });
            }
        };
        Ok(value)
    }

    fn to_primitive(&self, hint: PrimitiveHint) -> Option<Value> {
        Some(match hint {
            PrimitiveHint::Number => Value::Number(self.millis),
            PrimitiveHint::Default | PrimitiveHint::String => Value::from(self.display()),
        })
    }
}

const DATE_METHODS: [&str; GETTERS.len() + SETTERS.len()] = {
    let mut all = [""; GETTERS.len() + SETTERS.len()];
    let mut i = 0;
    while i < GETTERS.len() {
        all[i] = GETTERS[i];
        i += 1;
    }
    let mut j = 0;
    while j < SETTERS.len() {
        all[i + j] = SETTERS[j];
        j += 1;
    }
    all
};

/// Current time in milliseconds since the epoch.
pub fn now_millis() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0.0, |d| d.as_millis() as f64)
}

/// NaN outside the representable range, otherwise truncated toward zero.
pub fn time_clip(t: f64) -> f64 {
    if !t.is_finite() || t.abs() > MAX_TIME {
        f64::NAN
    } else {
        t.trunc() + 0.0
    }
}

/// Days since the epoch for a proleptic Gregorian date (month 1-12).
pub fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let m = i64::from(month);
    let mp = if m > 2 { m - 3 } else { m + 9 };
    let doy = (153 * mp + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Inverse of [`days_from_civil`]: `(year, month 1-12, day)`.
pub fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

fn fields(t: f64) -> Fields {
    let days = (t / MS_PER_DAY).floor();
    let ms_in_day = (t - days * MS_PER_DAY) as u32;
    let days = days as i64;
    let (year, month, day) = civil_from_days(days);
    Fields {
        year,
        month: month - 1,
        day,
        weekday: (days + 4).rem_euclid(7) as u32,
        hours: ms_in_day / 3_600_000,
        minutes: ms_in_day / 60_000 % 60,
        seconds: ms_in_day / 1000 % 60,
        millis: ms_in_day % 1000,
    }
}

/// Time value from calendar components. The month is zero-based and may
/// overflow into neighbouring years; two-digit years mean 19xx.
pub fn make_time(components: &[f64]) -> f64 {
    if components.iter().any(|c| !c.is_finite()) {
        return f64::NAN;
    }
    let get = |i: usize, default: f64| components.get(i).map_or(default, |c| c.trunc());
    let mut year = get(0, f64::NAN);
    if (0.0..=99.0).contains(&year) {
        year += 1900.0;
    }
    let month = get(1, 0.0);
    let year = year + (month / 12.0).floor();
    let month = month.rem_euclid(12.0);
    if year.abs() > 400_000.0 {
        return f64::NAN;
    }
    let days = days_from_civil(year as i64, month as u32 + 1, 1) as f64 + get(2, 1.0) - 1.0;
    let time = get(3, 0.0) * 3_600_000.0
        + get(4, 0.0) * 60_000.0
        + get(5, 0.0) * 1000.0
        + get(6, 0.0);
    time_clip(days * MS_PER_DAY + time)
}

/// Parse an ISO 8601 date or date-time. Times without an offset are UTC.
///
/// Accepts `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, optionally followed by
/// `THH:mm`, `:ss`, `.sss` and `Z` or `±HH:mm`. Extended years use a sign
/// and six digits. Anything else is NaN.
pub fn parse_iso(text: &str) -> f64 {
    parse_iso_parts(text.trim()).unwrap_or(f64::NAN)
}

fn parse_iso_parts(s: &str) -> Option<f64> {
    let mut cursor = Cursor { s, pos: 0 };

    let year = match cursor.peek() {
        Some(sign @ (b'+' | b'-')) => {
            cursor.pos += 1;
            let y = cursor.digits(6)? as i64;
            if sign == b'-' {
                if y == 0 {
                    return None;
                }
                -y
            } else {
                y
            }
        }
        _ => cursor.digits(4)? as i64,
    };
    let mut month = 1;
    let mut day = 1;
    if cursor.eat(b'-') {
        month = cursor.digits(2)?;
        if cursor.eat(b'-') {
            day = cursor.digits(2)?;
        }
    }
    if !(1..=12).contains(&month) || day < 1 || day > days_in_month(year, month) {
        return None;
    }

    let (mut hours, mut minutes, mut seconds, mut millis) = (0, 0, 0, 0);
    let mut offset_minutes = 0i64;
    if cursor.eat(b'T') || cursor.eat(b't') || cursor.eat(b' ') {
        hours = cursor.digits(2)?;
        if !cursor.eat(b':') {
            return None;
        }
        minutes = cursor.digits(2)?;
        if cursor.eat(b':') {
            seconds = cursor.digits(2)?;
            if cursor.eat(b'.') {
                let start = cursor.pos;
                let fraction = cursor.digits_any()?;
                let width = cursor.pos - start;
                millis = (fraction as f64 / 10f64.powi(width as i32 - 3)).trunc() as u32;
            }
        }
        if hours > 24 || minutes > 59 || seconds > 59 {
            return None;
        }
        if hours == 24 && (minutes, seconds, millis) != (0, 0, 0) {
            return None;
        }
        match cursor.peek() {
            Some(b'Z' | b'z') => cursor.pos += 1,
            Some(sign @ (b'+' | b'-')) => {
                cursor.pos += 1;
                let h = i64::from(cursor.digits(2)?);
                if !cursor.eat(b':') {
                    return None;
                }
                let m = i64::from(cursor.digits(2)?);
                let total = h * 60 + m;
                offset_minutes = if sign == b'-' { -total } else { total };
            }
            _ => {}
        }
    }
    if cursor.pos != s.len() {
        return None;
    }

    let days = days_from_civil(year, month, day) as f64;
    let time = f64::from(hours) * 3_600_000.0
        + f64::from(minutes) * 60_000.0
        + f64::from(seconds) * 1000.0
        + f64::from(millis)
        - offset_minutes as f64 * 60_000.0;
    let t = time_clip(days * MS_PER_DAY + time);
    (!t.is_nan()).then_some(t)
}

fn days_in_month(year: i64, month: u32) -> u32 {
    match month {
        2 if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

struct Cursor<'s> {
    s: &'s str,
    pos: usize,
}

impl Cursor<'_> {
    fn peek(&self) -> Option<u8> {
        self.s.as_bytes().get(self.pos).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Exactly `count` ASCII digits.
    fn digits(&mut self, count: usize) -> Option<u32> {
        let text = self.s.get(self.pos..self.pos + count)?;
        if !text.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        self.pos += count;
        text.parse().ok()
    }

    /// One to nine ASCII digits.
    fn digits_any(&mut self) -> Option<u32> {
        let rest = &self.s.as_bytes()[self.pos..];
        let count = rest.iter().take_while(|b| b.is_ascii_digit()).count();
        if count == 0 || count > 9 {
            return None;
        }
        self.digits(count)
    }
}
