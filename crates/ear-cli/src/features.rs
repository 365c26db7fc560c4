// Feature vector stream: one whitespace-separated vector per line.

use std::io::BufRead;

use crate::CliError;

/// Reads feature vectors from a text stream.
///
/// An empty line or the end of the stream ends the input.
pub struct FeatureReader<R> {
    input: R,
    line: String,
    line_no: usize,
    done: bool,
}

impl<R: BufRead> FeatureReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            line: String::new(),
            line_no: 0,
            done: false,
        }
    }

    /// Read the next vector into `out`. Returns `false` at the end of input.
    pub fn read_into(&mut self, out: &mut Vec<f32>) -> Result<bool, CliError> {
        out.clear();
        if self.done {
            return Ok(false);
        }
        self.line.clear();
        let read = self
            .input
            .read_line(&mut self.line)
            .map_err(|source| CliError::Read { source })?;
        self.line_no += 1;

        for field in self.line.split_whitespace() {
            let value = field.parse().map_err(|_| CliError::InvalidFeature {
                line: self.line_no,
                value: field.to_string(),
            })?;
            out.push(value);
        }
        if read == 0 || out.is_empty() {
            self.done = true;
            return Ok(false);
        }
        Ok(true)
    }

    /// Lines consumed so far.
    pub fn line_no(&self) -> usize {
        self.line_no
    }
}

/// Root mean square of `vector`, 0 for an empty one.
pub fn rms(vector: &[f32]) -> f32 {
    if vector.is_empty() {
        return 0.0;
    }
    let sum: f32 = vector.iter().map(|v| v * v).sum();
    (sum / vector.len() as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(text: &str) -> Result<Vec<Vec<f32>>, CliError> {
        let mut reader = FeatureReader::new(text.as_bytes());
        let mut vectors = Vec::new();
        let mut v = Vec::new();
        while reader.read_into(&mut v)? {
            vectors.push(v.clone());
        }
        Ok(vectors)
    }

    #[test]
    fn one_vector_per_line() {
        let vectors = read_all("1 2.5 -3\n0\t4e-1 7\n").unwrap();
        assert_eq!(vectors, vec![vec![1.0, 2.5, -3.0], vec![0.0, 0.4, 7.0]]);
    }

    #[test]
    fn empty_line_ends_stream() {
        let vectors = read_all("1 2\n\n3 4\n").unwrap();
        assert_eq!(vectors, vec![vec![1.0, 2.0]]);
    }

    #[test]
    fn stays_done_after_end() {
        let mut reader = FeatureReader::new("1\n".as_bytes());
        let mut v = Vec::new();
        assert!(reader.read_into(&mut v).unwrap());
        assert!(!reader.read_into(&mut v).unwrap());
        assert!(!reader.read_into(&mut v).unwrap());
        assert!(v.is_empty());
    }

    #[test]
    fn reject_non_numeric_field() {
        let err = read_all("1 2\n3 x\n").unwrap_err();
        assert!(matches!(
            err,
            CliError::InvalidFeature { line: 2, ref value } if value == "x"
        ));
    }

    #[test]
    fn rms_of_vector() {
        assert_eq!(rms(&[]), 0.0);
        assert!((rms(&[3.0, -4.0]) - (12.5f32).sqrt()).abs() < 1e-6);
    }
}
