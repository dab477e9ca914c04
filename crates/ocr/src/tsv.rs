//! Decoding of Tesseract TSV output into a word-token stream
//!
//! Each TSV row is
//! `level page_num block_num par_num line_num word_num left top width height conf text`.
//! Rows above word level (page, block, paragraph, line) have no text and
//! are kept as empty boundary tokens, so a new line always starts after at
//! least one empty token.

use poster_common::WordToken;

/// Index of the text column
const TEXT_COLUMN: usize = 11;

/// Decode TSV text into tokens in row order.
///
/// An optional header row (`level\tpage_num...`) and blank rows are
/// skipped. Word text is trimmed.
#[must_use]
pub fn decode_tsv(tsv: &str) -> Vec<WordToken> {
    tsv.lines()
        .filter(|row| !row.trim().is_empty())
        .filter(|row| !row.starts_with("level"))
        .enumerate()
        .map(|(index, row)| {
            let text = row
                .splitn(TEXT_COLUMN + 1, '\t')
                .nth(TEXT_COLUMN)
                .map(str::trim)
                .unwrap_or_default();
            WordToken::new(text, index)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
1\t1\t0\t0\t0\t0\t0\t0\t2000\t1400\t-1\t
2\t1\t1\t0\t0\t0\t40\t30\t1900\t90\t-1\t
3\t1\t1\t1\t0\t0\t40\t30\t1900\t90\t-1\t
4\t1\t1\t1\t1\t0\t40\t30\t1900\t90\t-1\t
5\t1\t1\t1\t1\t1\t40\t30\t200\t90\t91.2\tSamedi
5\t1\t1\t1\t1\t2\t260\t30\t300\t90\t88.0\t1O/O5/2O24
4\t1\t1\t1\t2\t0\t40\t130\t1900\t90\t-1\t
5\t1\t1\t1\t2\t1\t40\t130\t250\t90\t90.5\tDimanche
";

    #[test]
    fn test_decode_sample() {
        let tokens = decode_tsv(SAMPLE);
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["", "", "", "", "Samedi", "1O/O5/2O24", "", "Dimanche"]
        );
        assert_eq!(tokens[5].sequence_index, 5);
    }

    #[test]
    fn test_decode_without_header() {
        let tsv = "4\t1\t1\t1\t1\t0\t0\t0\t10\t10\t-1\t\n5\t1\t1\t1\t1\t1\t0\t0\t10\t10\t95\tDJ\n";
        let tokens = decode_tsv(tsv);
        assert_eq!(tokens.len(), 2);
        assert!(tokens[0].is_boundary());
        assert_eq!(tokens[1].text, "DJ");
    }

    #[test]
    fn test_text_with_embedded_tab_is_kept_whole() {
        let tsv = "5\t1\t1\t1\t1\t1\t0\t0\t10\t10\t95\tfoo\tbar\n";
        assert_eq!(decode_tsv(tsv)[0].text, "foo\tbar");
    }

    #[test]
    fn test_truncated_rows_become_boundaries() {
        let tokens = decode_tsv("1\t1\t0\n");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_boundary());
    }

    #[test]
    fn test_empty_output() {
        assert!(decode_tsv("").is_empty());
    }
}
