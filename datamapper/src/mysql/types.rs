//! Conversion between datamapper values and mysql_async values

use crate::error::{Error, Result};
use crate::value::Value;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use mysql_async::Value as MySqlValue;

/// Convert a datamapper Value to a mysql_async Value
pub fn to_mysql_value(value: &Value) -> MySqlValue {
    match value {
        Value::Null => MySqlValue::NULL,
        Value::Bool(v) => MySqlValue::from(*v),
        Value::Int(v) => MySqlValue::Int(*v),
        Value::UInt(v) => MySqlValue::UInt(*v),
        Value::Float(v) => MySqlValue::Double(*v),
        Value::Decimal(v) => MySqlValue::from(v.to_string()),
        Value::String(v) => MySqlValue::from(v.as_str()),
        Value::Bytes(v) => MySqlValue::from(v.as_slice()),
        Value::Date(v) => {
            MySqlValue::Date(v.year() as u16, v.month() as u8, v.day() as u8, 0, 0, 0, 0)
        }
        Value::DateTime(v) => MySqlValue::Date(
            v.year() as u16,
            v.month() as u8,
            v.day() as u8,
            v.hour() as u8,
            v.minute() as u8,
            v.second() as u8,
            v.and_utc().timestamp_subsec_micros(),
        ),
        Value::Time(v) => MySqlValue::Time(
            false,
            0,
            v.hour() as u8,
            v.minute() as u8,
            v.second() as u8,
            v.nanosecond() / 1000,
        ),
    }
}

/// Convert a mysql_async Value to a datamapper Value
pub fn from_mysql_value(value: MySqlValue) -> Result<Value> {
    match value {
        MySqlValue::NULL => Ok(Value::Null),
        MySqlValue::Bytes(v) => match String::from_utf8(v) {
            Ok(s) => Ok(Value::String(s)),
            Err(e) => Ok(Value::Bytes(e.into_bytes())),
        },
        MySqlValue::Int(v) => Ok(Value::Int(v)),
        MySqlValue::UInt(v) => Ok(Value::UInt(v)),
        MySqlValue::Float(v) => Ok(Value::Float(v.into())),
        MySqlValue::Double(v) => Ok(Value::Float(v)),
        MySqlValue::Date(year, month, day, hour, min, sec, micro) => {
            let date = NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
                .ok_or_else(|| Error::TypeConversion {
                    expected: "date",
                    actual: format!("{}-{}-{}", year, month, day),
                })?;
            if hour == 0 && min == 0 && sec == 0 && micro == 0 {
                return Ok(Value::Date(date));
            }
            let time = NaiveTime::from_hms_micro_opt(hour as u32, min as u32, sec as u32, micro)
                .ok_or_else(|| Error::TypeConversion {
                    expected: "time",
                    actual: format!("{}:{}:{}.{}", hour, min, sec, micro),
                })?;
            Ok(Value::DateTime(NaiveDateTime::new(date, time)))
        }
        MySqlValue::Time(is_neg, days, hours, mins, secs, micro) => {
            // NaiveTime only covers 00:00:00 to 23:59:59
            if is_neg || days > 0 || hours >= 24 {
                return Err(Error::TypeConversion {
                    expected: "time (00:00:00 to 23:59:59)",
                    actual: format!(
                        "{}{}:{:02}:{:02}",
                        if is_neg { "-" } else { "" },
                        days * 24 + hours as u32,
                        mins,
                        secs
                    ),
                });
            }
            let time = NaiveTime::from_hms_micro_opt(hours as u32, mins as u32, secs as u32, micro)
                .ok_or_else(|| Error::TypeConversion {
                    expected: "time",
                    actual: format!("{}:{}:{}.{}", hours, mins, secs, micro),
                })?;
            Ok(Value::Time(time))
        }
    }
}
