use crate::types::Segment;
use tracing::debug;

/// Splits messages into alternating literal and formula segments.
pub struct FormulaSplitter {
    delimiter: String,
}

impl FormulaSplitter {
    pub fn new(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
        }
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn contains_formula(&self, text: &str) -> bool {
        !self.delimiter.is_empty() && text.contains(self.delimiter.as_str())
    }

    /// Split `text` on the delimiter.
    ///
    /// Even positions are literal and odd positions are formulas. An odd number
    /// of delimiters leaves the last one unpaired: it and everything after it
    /// stay in a final literal segment, so the result always ends with a literal.
    pub fn split(&self, text: &str) -> Vec<Segment> {
        if !self.contains_formula(text) {
            return vec![Segment::Literal(text.to_string())];
        }

        let delimiter = self.delimiter.as_str();
        let mut pieces: Vec<&str> = text.split(delimiter).collect();

        let unmatched_tail = if pieces.len() % 2 == 0 {
            let tail = pieces.split_off(pieces.len() - 2);
            Some(tail.join(delimiter))
        } else {
            None
        };

        let mut segments: Vec<Segment> = pieces
            .into_iter()
            .enumerate()
            .map(|(index, piece)| {
                if index % 2 == 1 {
                    Segment::Formula(piece.to_string())
                } else {
                    Segment::Literal(piece.to_string())
                }
            })
            .collect();

        if let Some(tail) = unmatched_tail {
            debug!("Unmatched delimiter, keeping '{}' as literal text", tail);
            segments.push(Segment::Literal(tail));
        }

        segments
    }

    pub fn formula_count(segments: &[Segment]) -> usize {
        segments.iter().filter(|segment| segment.is_formula()).count()
    }
}

impl Default for FormulaSplitter {
    fn default() -> Self {
        Self::new(crate::types::DELIMITER)
    }
}
