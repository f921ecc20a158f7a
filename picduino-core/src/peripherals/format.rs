//! Fixed-column number lines
//!
//! A labelled value is rendered into a 20-column field laid out as
//! `label -D,DDD,DDD,DDD`: the sign sits in column 6 and the ten digits
//! fill columns 7 to 19 with thousands separators in between. The label
//! occupies the columns the number does not.

use heapless::String;

/// Capacity of a formatted line
pub const LINE_WIDTH: usize = 40;

const FIELD_WIDTH: usize = 20;
const SIGN_COLUMN: usize = 6;
/// Digit columns, least significant first
const DIGIT_COLUMNS: [usize; 10] = [19, 18, 17, 15, 14, 13, 11, 10, 9, 7];
const COMMA_COLUMNS: [usize; 3] = [8, 12, 16];

/// Render `label` and `value` into one line
///
/// Labels longer than the line are cut short. Non-ASCII characters in the
/// label are replaced with `?` so column positions stay byte positions.
pub fn format_number(label: &str, value: i32) -> String<LINE_WIDTH> {
    let mut buf = [b' '; LINE_WIDTH - 1];
    let mut len = 0;
    for (slot, c) in buf.iter_mut().zip(label.chars()) {
        *slot = if c.is_ascii() { c as u8 } else { b'?' };
        len += 1;
    }
    let len = len.max(FIELD_WIDTH);

    if value < 0 {
        buf[SIGN_COLUMN] = b'-';
    }
    let mut magnitude = value.unsigned_abs();
    for column in DIGIT_COLUMNS {
        buf[column] = b'0' + (magnitude % 10) as u8;
        magnitude /= 10;
    }
    for column in COMMA_COLUMNS {
        buf[column] = b',';
    }

    // `buf` is one byte short of the line capacity
    buf[..len].iter().map(|&byte| char::from(byte)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_value() {
        assert_eq!(format_number("tmr =", 1_234_567).as_str(), "tmr =  0,001,234,567");
    }

    #[test]
    fn test_negative_value() {
        assert_eq!(format_number("x", -42).as_str(), "x     -0,000,000,042");
    }

    #[test]
    fn test_extremes() {
        assert_eq!(format_number("", i32::MIN).as_str(), "      -2,147,483,648");
        assert_eq!(format_number("", 0).as_str(), "       0,000,000,000");
    }

    #[test]
    fn test_long_label_keeps_tail() {
        let line = format_number("abcdefghijklmnopqrstuvwxyz", 5);
        assert_eq!(line.as_str(), "abcdefg0,000,000,005uvwxyz");
    }

    #[test]
    fn test_label_cut_to_line_capacity() {
        let label = "0123456789012345678901234567890123456789012345678901234567890";
        let line = format_number(label, 0);
        assert_eq!(line.len(), LINE_WIDTH - 1);
        assert_eq!(&line[20..], &label[20..LINE_WIDTH - 1]);
    }

    #[test]
    fn test_non_ascii_label() {
        let line = format_number("µs", 1);
        assert_eq!(&line[..2], "?s");
        assert_eq!(line.len(), FIELD_WIDTH);
    }
}
