use crate::config::EntryRules;

/// Converts raw keystrokes into canonical numeric text and back.
///
/// The field is controlled: after every keystroke the displayed text is
/// replaced by `format(parse(text))`. Anything that is not an ASCII digit is
/// dropped, so pasting arbitrary content never fails.
///
/// ```
/// use tally_entry::formatter::NumericFormatter;
///
/// let formatter = NumericFormatter::default();
/// assert_eq!(formatter.normalize("12345"), "12.345");
/// assert_eq!(formatter.parse("12.345"), 12345);
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct NumericFormatter {
    max_digits: usize,
    separator: char,
}

impl NumericFormatter {
    pub fn new(rules: &EntryRules) -> NumericFormatter {
        NumericFormatter {
            max_digits: rules.max_digits,
            separator: rules.thousands_separator,
        }
    }

    /// The significant digits of the input, truncated to the maximum length.
    ///
    /// Leading zeros are not significant and do not count against the limit.
    pub fn digits(&self, raw: &str) -> String {
        raw.chars()
            .filter(|c| c.is_ascii_digit())
            .skip_while(|c| *c == '0')
            .take(self.max_digits)
            .collect()
    }

    /// Reads the integer value of some text. Empty input is 0.
    pub fn parse(&self, raw: &str) -> u64 {
        self.digits(raw).bytes().fold(0u64, |acc, b| {
            acc.saturating_mul(10).saturating_add((b - b'0') as u64)
        })
    }

    /// Renders a value with a separator every three digits from the right.
    pub fn format(&self, value: u64) -> String {
        let digits = value.to_string();
        let mut res = String::with_capacity(digits.len() + digits.len() / 3);
        for (idx, c) in digits.chars().enumerate() {
            if idx > 0 && (digits.len() - idx) % 3 == 0 {
                res.push(self.separator);
            }
            res.push(c);
        }
        res
    }

    /// The canonical display text for some raw input.
    pub fn normalize(&self, raw: &str) -> String {
        self.format(self.parse(raw))
    }
}

impl Default for NumericFormatter {
    fn default() -> Self {
        NumericFormatter::new(&EntryRules::DEFAULT_RULES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paste_is_formatted_immediately() {
        let f = NumericFormatter::default();
        assert_eq!(f.normalize("12345"), "12.345");
        assert_eq!(f.parse("12.345"), 12345);
    }

    #[test]
    fn separators() {
        let f = NumericFormatter::default();
        assert_eq!(f.format(0), "0");
        assert_eq!(f.format(999), "999");
        assert_eq!(f.format(1000), "1.000");
        assert_eq!(f.format(100000), "100.000");
        assert_eq!(f.format(999999999), "999.999.999");
    }

    #[test]
    fn empty_and_garbage_are_zero() {
        let f = NumericFormatter::default();
        assert_eq!(f.parse(""), 0);
        assert_eq!(f.parse("abc"), 0);
        assert_eq!(f.normalize("-x-"), "0");
        assert_eq!(f.parse("1a2b3"), 123);
        assert_eq!(f.parse("-42"), 42);
    }

    #[test]
    fn extra_digits_are_dropped() {
        let f = NumericFormatter::default();
        assert_eq!(f.parse("1234567890"), 123456789);
        assert_eq!(f.normalize("123.456.7891"), "123.456.789");
        // Leading zeros do not use up the budget.
        assert_eq!(f.parse("000000000012"), 12);
    }

    #[test]
    fn custom_rules() {
        let f = NumericFormatter::new(&EntryRules {
            max_digits: 4,
            thousands_separator: ' ',
        });
        assert_eq!(f.normalize("123456"), "1 234");
    }

    #[test]
    fn typing_digit_by_digit() {
        let f = NumericFormatter::default();
        let mut displayed = String::new();
        for d in "123456789".chars() {
            displayed.push(d);
            displayed = f.normalize(&displayed);
            assert_eq!(displayed, f.format(f.parse(&displayed)));
        }
        assert_eq!(displayed, "123.456.789");
        assert_eq!(f.parse(&displayed), 123456789);
        // The tenth keystroke has no effect.
        displayed.push('0');
        assert_eq!(f.normalize(&displayed), "123.456.789");
    }
}
