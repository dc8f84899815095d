use std::fmt;
use internment::Intern;

/// A line within a named source (a file, `stdin`, or an in-memory buffer).
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct SrcLoc {
    name: Intern<String>,
    line: i64,
}

impl SrcLoc {
    pub fn new(name: &str, line: i64) -> Self {
        Self {
            name: Intern::new(name.to_owned()),
            line,
        }
    }

    pub fn unknown() -> Self {
        Self::new("<unknown>", 0)
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn line(&self) -> i64 {
        self.line
    }
}

impl fmt::Debug for SrcLoc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.line)
    }
}

impl fmt::Display for SrcLoc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_name_and_line() {
        let loc = SrcLoc::new("boot.lisp", 4);
        assert_eq!(loc.to_string(), "boot.lisp(4)");
        assert_eq!(loc.name(), "boot.lisp");
        assert_eq!(loc, SrcLoc::new("boot.lisp", 4));
        assert_ne!(loc, SrcLoc::unknown());
    }
}
