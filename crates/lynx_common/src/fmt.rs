use core::fmt::{Display, Formatter, Result};

enum SeparatorFormat<'a> {
    Spaced(usize),
    Str(&'a str),
}

/// Displays a sequence of values, with a separator between each pair of values
///
/// Any format options are applied to every value separately.
pub struct Separated<'a, T> {
    items:  &'a [T],
    format: SeparatorFormat<'a>,
}

impl<'a, T> Separated<'a, T> {
    pub fn new(items: &'a [T], separator: &'a str) -> Self {
        Self { items, format: SeparatorFormat::Str(separator) }
    }

    pub fn with_spaced(items: &'a [T], spaces: usize) -> Self {
        Self { items, format: SeparatorFormat::Spaced(spaces) }
    }

    pub fn set_spaces(&mut self, spaces: usize) {
        self.format = SeparatorFormat::Spaced(spaces)
    }

    pub fn set_str(&mut self, s: &'a str) {
        self.format = SeparatorFormat::Str(s)
    }

    fn write_separator(&self, f: &mut Formatter<'_>) -> Result {
        match self.format {
            SeparatorFormat::Spaced(size) => write!(f, "{: >size$}", ""),
            SeparatorFormat::Str(s) => f.write_str(s),
        }
    }
}

impl<T: Display> Display for Separated<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let mut iter = self.items.iter();
        if let Some(first) = iter.next() {
            Display::fmt(first, f)?;
            for item in iter {
                self.write_separator(f)?;
                Display::fmt(item, f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Separated;

    #[test]
    fn separated() {
        assert_eq!(Separated::new(&[1, 2, 3], ", ").to_string(), "1, 2, 3");
        assert_eq!(Separated::with_spaced(&["a", "b"], 2).to_string(), "a  b");
        assert_eq!(Separated::<u8>::new(&[], " ").to_string(), "");
        assert_eq!(Separated::new(&[7], " ").to_string(), "7");
    }

    #[test]
    fn options_apply_per_value() {
        let mut sep = Separated::new(&[1.54f32, 2.26], "|");
        assert_eq!(format!("{sep:.1}"), "1.5|2.3");

        sep.set_spaces(1);
        assert_eq!(format!("{sep:>5}"), " 1.54  2.26");
        sep.set_str("-");
        assert_eq!(sep.to_string(), "1.54-2.26");
    }
}
