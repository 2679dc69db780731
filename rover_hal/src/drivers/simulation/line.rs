//! Scripted line sensor.

use rover_common::hal::driver::{HalError, LineSensor};

/// Replays a fixed sequence of raw reflectance masks, wrapping at the end.
///
/// An empty script reads "both detectors on the line" forever.
#[derive(Debug, Clone)]
pub struct ScriptedLine {
    script: Vec<u8>,
    pos: usize,
    reads: u64,
}

impl ScriptedLine {
    /// Sensor that replays `script`.
    pub fn new(script: Vec<u8>) -> Self {
        Self {
            script,
            pos: 0,
            reads: 0,
        }
    }

    /// Sensor that always returns `raw`.
    pub fn constant(raw: u8) -> Self {
        Self::new(vec![raw])
    }

    /// Parse a comma-separated list of raw masks, e.g. `"3,3,2,2,0"`.
    ///
    /// Entries may be decimal or `0b`-prefixed binary.
    pub fn parse(text: &str) -> Result<Self, HalError> {
        let script = text
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| {
                let parsed = match t.strip_prefix("0b") {
                    Some(bits) => u8::from_str_radix(bits, 2),
                    None => t.parse::<u8>(),
                };
                parsed.map_err(|e| HalError::InitFailed(format!("invalid line script entry '{t}': {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(script))
    }

    /// Number of reads served so far.
    pub const fn reads(&self) -> u64 {
        self.reads
    }

    /// Script length.
    pub fn len(&self) -> usize {
        self.script.len()
    }

    /// Whether the script is empty.
    pub fn is_empty(&self) -> bool {
        self.script.is_empty()
    }
}

impl LineSensor for ScriptedLine {
    fn read_line(&mut self) -> u8 {
        self.reads += 1;
        if self.script.is_empty() {
            return 0b11;
        }
        let raw = self.script[self.pos];
        self.pos = (self.pos + 1) % self.script.len();
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_around() {
        let mut s = ScriptedLine::new(vec![3, 2, 0]);
        let got: Vec<u8> = (0..5).map(|_| s.read_line()).collect();
        assert_eq!(got, vec![3, 2, 0, 3, 2]);
        assert_eq!(s.reads(), 5);
    }

    #[test]
    fn empty_script_reads_on_line() {
        let mut s = ScriptedLine::new(Vec::new());
        assert_eq!(s.read_line(), 0b11);
    }

    #[test]
    fn parses_decimal_and_binary() {
        let mut s = ScriptedLine::parse("3, 0b10,1,").unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!([s.read_line(), s.read_line(), s.read_line()], [3, 2, 1]);
    }

    #[test]
    fn rejects_garbage() {
        let err = ScriptedLine::parse("3,x").unwrap_err();
        assert!(matches!(err, HalError::InitFailed(ref m) if m.contains("'x'")));
    }
}
