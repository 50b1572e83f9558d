//! Delimiter discovery from the ISA header
//!
//! X12 interchanges declare their own separators: the element separator is
//! the byte following the `ISA` tag, the repetition separator is carried in
//! ISA11 (version 5010), the sub-element separator is ISA16, and the segment
//! terminator is whatever follows ISA16. Files in the wild pad segments with
//! newlines and indentation, so the terminator probe skips whitespace when
//! the nominal position holds some.

use crate::error::{Error, Result};

/// Number of elements in an ISA segment.
const ISA_ELEMENT_COUNT: usize = 16;

/// The four separators governing an interchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiters {
    pub element: char,
    pub repetition: char,
    pub sub_element: char,
    pub segment: char,
}

impl Delimiters {
    /// Discover the separator set from the start of an interchange. `input`
    /// must begin with `ISA`.
    pub fn discover(input: &str) -> Result<Self> {
        if !input.starts_with("ISA") {
            return Err(Error::malformed("interchange does not begin with ISA"));
        }
        let mut chars = input.char_indices().skip(3);
        let (_, element) = chars
            .next()
            .ok_or_else(|| Error::malformed("ISA header truncated before element separator"))?;
        if !element.is_ascii() || element.is_ascii_alphanumeric() {
            return Err(Error::malformed(format!(
                "element separator {element:?} is not a valid X12 separator"
            )));
        }

        // Walk the remaining ISA elements to reach ISA16. The separator
        // after the ISA tag was consumed above, so `elements[i]` holds
        // ISA<i+1> and ISA16 begins once 15 further separators have passed.
        let mut separators_seen = 0usize;
        let mut elements: Vec<String> = vec![String::new()];
        let mut sub_element = None;
        let mut terminator_at = None;
        for (index, c) in chars {
            if c == element {
                separators_seen += 1;
                elements.push(String::new());
                continue;
            }
            if separators_seen == ISA_ELEMENT_COUNT - 1 {
                // First character of ISA16 is the sub-element separator; the
                // character after it terminates the segment.
                if sub_element.is_none() {
                    sub_element = Some(c);
                } else {
                    terminator_at = Some(index);
                    break;
                }
                continue;
            }
            elements.last_mut().expect("elements is never empty").push(c);
        }

        let sub_element = sub_element
            .ok_or_else(|| Error::malformed("ISA header truncated before sub-element separator"))?;
        let terminator_at = terminator_at
            .ok_or_else(|| Error::malformed("segment terminator undetectable after ISA16"))?;
        // A newline at the nominal position is itself the terminator; space
        // or tab there means the file pads segments, so probe forward.
        let candidate = input[terminator_at..]
            .chars()
            .next()
            .expect("terminator position is within input");
        let segment = if candidate == ' ' || candidate == '\t' {
            input[terminator_at..]
                .chars()
                .find(|c| !c.is_whitespace())
                .ok_or_else(|| Error::malformed("segment terminator undetectable after ISA16"))?
        } else {
            candidate
        };
        if segment == element || segment == sub_element {
            return Err(Error::malformed(
                "segment terminator collides with another separator",
            ));
        }

        // ISA11 (`elements[10]`) is the repetition separator in 5010; 4010
        // interchanges carry a standards identifier letter there, in which
        // case fall back to the conventional '^'.
        let repetition = elements
            .get(10)
            .and_then(|e| e.chars().next())
            .filter(|c| !c.is_ascii_alphanumeric())
            .unwrap_or('^');

        Ok(Delimiters {
            element,
            repetition,
            sub_element,
            segment,
        })
    }
}
