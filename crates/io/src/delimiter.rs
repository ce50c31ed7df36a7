use serde::Serialize;

/// Candidate separators, in tie-break order.
pub const CANDIDATES: [char; 4] = ['|', ';', ',', '\t'];

/// Used when no candidate occurs in the header line.
pub const DEFAULT_SEPARATOR: char = ',';

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DelimiterGuess {
    pub separator: char,
    /// Occurrences of each candidate in the header line, in candidate order.
    pub counts: Vec<(char, usize)>,
    /// False when nothing was found and the default was used.
    pub detected: bool,
}

/// Pick the separator by frequency in the header line. The most frequent
/// candidate wins; ties go to the earlier candidate in [`CANDIDATES`].
pub fn detect_delimiter(header_line: &str) -> DelimiterGuess {
    let counts: Vec<(char, usize)> = CANDIDATES
        .iter()
        .map(|&c| (c, header_line.matches(c).count()))
        .collect();

    let mut best = (DEFAULT_SEPARATOR, 0usize);
    for &(c, n) in &counts {
        if n > best.1 {
            best = (c, n);
        }
    }

    DelimiterGuess {
        separator: best.0,
        counts,
        detected: best.1 > 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn most_frequent_wins() {
        assert_eq!(detect_delimiter("Setor;Nome;Codigo").separator, ';');
        assert_eq!(detect_delimiter("a\tb\tc").separator, '\t');
        assert_eq!(detect_delimiter("a|b|c,d").separator, '|');
        assert_eq!(detect_delimiter("a,b,c;d").separator, ',');
    }

    #[test]
    fn ties_follow_candidate_order() {
        assert_eq!(detect_delimiter("a;b|c").separator, '|');
        assert_eq!(detect_delimiter("a,b;c").separator, ';');
        assert_eq!(detect_delimiter("a\tb,c").separator, ',');
    }

    #[test]
    fn nothing_found_defaults_to_comma() {
        let guess = detect_delimiter("SKU");
        assert_eq!(guess.separator, ',');
        assert!(!guess.detected);
        assert!(guess.counts.iter().all(|&(_, n)| n == 0));
    }

    #[test]
    fn counts_are_reported() {
        let guess = detect_delimiter("a|b|c;d");
        assert!(guess.detected);
        assert_eq!(guess.counts, vec![('|', 2), (';', 1), (',', 0), ('\t', 0)]);
    }
}
