//! RPM version comparison.
//!
//! Implements the `rpmvercmp` algorithm used to order package versions:
//! alternating digit and letter runs are compared segment by segment, digit
//! runs numerically and letter runs lexicographically, with `~` sorting a
//! version before its base (pre-release) and `^` sorting it after
//! (post-release). Non-alphanumeric separators only delimit segments and
//! never influence the result.
//!
//! # Example
//!
//! ```rust
//! use std::cmp::Ordering;
//! use rpmseal::vercmp;
//!
//! assert_eq!(vercmp("1.0~rc1", "1.0"), Ordering::Less);
//! assert_eq!(vercmp("1.0^git1", "1.0"), Ordering::Greater);
//! assert_eq!(vercmp("10.0001", "10.1"), Ordering::Equal);
//! ```

use std::cmp::Ordering;

/// Compares two version (or release) strings with the rpmvercmp rules.
pub fn vercmp(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    let a = a.as_bytes();
    let b = b.as_bytes();
    let mut i = 0;
    let mut j = 0;

    while i < a.len() || j < b.len() {
        // Separators delimit segments but do not participate.
        while i < a.len() && !is_segment_byte(a[i]) {
            i += 1;
        }
        while j < b.len() && !is_segment_byte(b[j]) {
            j += 1;
        }

        // Tilde sorts before everything, including the end of the string.
        let a_tilde = i < a.len() && a[i] == b'~';
        let b_tilde = j < b.len() && b[j] == b'~';
        if a_tilde || b_tilde {
            if !a_tilde {
                return Ordering::Greater;
            }
            if !b_tilde {
                return Ordering::Less;
            }
            i += 1;
            j += 1;
            continue;
        }

        // Caret sorts after the end of the string but before any segment.
        let a_caret = i < a.len() && a[i] == b'^';
        let b_caret = j < b.len() && b[j] == b'^';
        if a_caret || b_caret {
            if i == a.len() {
                return Ordering::Less;
            }
            if j == b.len() {
                return Ordering::Greater;
            }
            if !a_caret {
                return Ordering::Greater;
            }
            if !b_caret {
                return Ordering::Less;
            }
            i += 1;
            j += 1;
            continue;
        }

        if i == a.len() || j == b.len() {
            break;
        }

        // Both sides sit on an alphanumeric segment; its kind is decided
        // by the left side.
        let numeric = a[i].is_ascii_digit();
        let run_a = take_run(a, &mut i, numeric);
        let run_b = take_run(b, &mut j, numeric);

        if run_b.is_empty() {
            // Mismatched kinds: a numeric segment is newer than a letter
            // segment.
            return if numeric {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }

        let ord = if numeric {
            compare_numeric(run_a, run_b)
        } else {
            run_a.cmp(run_b)
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    match (i == a.len(), j == b.len()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, _) => Ordering::Greater,
    }
}

fn is_segment_byte(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'~' || c == b'^'
}

fn take_run<'a>(s: &'a [u8], pos: &mut usize, numeric: bool) -> &'a [u8] {
    let start = *pos;
    while *pos < s.len() {
        let c = s[*pos];
        let matches = if numeric {
            c.is_ascii_digit()
        } else {
            c.is_ascii_alphabetic()
        };
        if !matches {
            break;
        }
        *pos += 1;
    }
    &s[start..*pos]
}

fn compare_numeric(a: &[u8], b: &[u8]) -> Ordering {
    let a = trim_leading_zeros(a);
    let b = trim_leading_zeros(b);
    // Longer digit run wins; equal lengths compare digit by digit.
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn trim_leading_zeros(s: &[u8]) -> &[u8] {
    let start = s.iter().position(|&c| c != b'0').unwrap_or(s.len());
    &s[start..]
}
