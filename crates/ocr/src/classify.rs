use crate::patterns::re_date;
use crate::types::Candidate;

/// Picks the OCR lines that can be transaction rows. The date is the anchor:
/// every character of `YYYY-MM-DD` has a known digit/hyphen identity, so it
/// survives OCR noise better than anything else on the line.
#[derive(Debug, Clone, Copy)]
pub struct LineClassifier {
    min_line_length: usize,
}

impl LineClassifier {
    pub fn new(min_line_length: usize) -> Self {
        Self { min_line_length }
    }

    pub fn is_candidate(&self, line: &str) -> bool {
        let line = line.trim();
        !line.is_empty()
            && line.chars().count() >= self.min_line_length
            && re_date().is_match(line)
    }

    /// Candidate lines in source order, numbered from 1.
    pub fn classify<'a>(&self, text: &'a str) -> Vec<Candidate<'a>> {
        text.lines()
            .enumerate()
            .filter(|(_, l)| self.is_candidate(l))
            .map(|(i, l)| Candidate { line_no: i + 1, text: l.trim() })
            .collect()
    }
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new(10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_line_is_rejected() {
        let c = LineClassifier::default();
        assert!(!c.is_candidate("FECHA DESCRIPCION MONTO DOCUMENTO"));
    }

    #[test]
    fn blank_and_short_lines_are_rejected() {
        let c = LineClassifier::default();
        assert!(!c.is_candidate(""));
        assert!(!c.is_candidate("     "));
        // Exactly the date: 10 chars, passes length, has the anchor.
        assert!(c.is_candidate("2022-09-05"));
        assert!(!LineClassifier::new(11).is_candidate("  2022-09-05  "));
    }

    #[test]
    fn date_anchor_can_sit_anywhere() {
        let c = LineClassifier::default();
        assert!(c.is_candidate("| 2022-09-05 15:08 PAGO 1.00 1"));
    }

    #[test]
    fn partial_dates_are_rejected() {
        let c = LineClassifier::default();
        assert!(!c.is_candidate("2022-9-05 15:08 PAGO 10.00 123"));
        assert!(!c.is_candidate("2022/09/05 15:08 PAGO 10.00 123"));
    }

    #[test]
    fn classify_keeps_order_and_line_numbers() {
        let text = "BANCO XYZ\n\
                    FECHA DESCRIPCION MONTO DOCUMENTO\n\
                    2022-09-05 15:08 POSTGRADO 4800.00 31571483\n\
                    \n\
                    2022-09-06 10:00 MATRICULA 120.00 31571484\n";
        let cands = LineClassifier::default().classify(text);
        assert_eq!(cands.len(), 2);
        assert_eq!(cands[0].line_no, 3);
        assert_eq!(cands[1].line_no, 5);
        assert!(cands[1].text.starts_with("2022-09-06"));
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // "ñ" is two bytes; the trimmed line is 11 characters.
        let c = LineClassifier::new(12);
        assert!(!c.is_candidate("2022-09-05ñ"));
    }
}
