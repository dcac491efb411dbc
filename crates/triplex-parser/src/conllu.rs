//! CoNLL-U document loader
//!
//! Reads the ten-column CoNLL-U format. Sentences are concatenated into a
//! single document; sentence-local head numbers are rebased onto document
//! positions and a `HEAD` of 0 (the sentence root) becomes a self-reference.

use triplex_core::{DepLabel, Document, PartOfSpeech, Token, TokenId};

use crate::{DocumentFormat, DocumentLoader, ParserError, Result};

const COLUMNS: usize = 10;
const COL_ID: usize = 0;
const COL_FORM: usize = 1;
const COL_UPOS: usize = 3;
const COL_HEAD: usize = 6;
const COL_DEPREL: usize = 7;
const COL_MISC: usize = 9;

/// CoNLL-U loader
pub struct ConlluLoader;

impl DocumentLoader for ConlluLoader {
    fn load_str(&self, content: &str) -> Result<Document> {
        let mut reader = SentenceReader::default();

        for (i, line) in content.lines().enumerate() {
            let line_no = i + 1;
            let line = line.trim_end_matches('\r');

            if line.trim().is_empty() {
                reader.finish_sentence(line_no)?;
                continue;
            }
            if line.starts_with('#') {
                continue;
            }

            reader.push_row(line, line_no)?;
        }
        reader.finish_sentence(content.lines().count() + 1)?;

        Ok(Document::from_tokens(reader.tokens)?)
    }

    fn supported_formats(&self) -> &[DocumentFormat] {
        &[DocumentFormat::Conllu]
    }
}

#[derive(Default)]
struct SentenceReader {
    tokens: Vec<Token>,
    /// Document position of the current sentence's first word
    sentence_start: usize,
}

impl SentenceReader {
    fn push_row(&mut self, line: &str, line_no: usize) -> Result<()> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != COLUMNS {
            return Err(malformed(
                line_no,
                format!("expected {COLUMNS} columns, found {}", fields.len()),
            ));
        }

        let id_field = fields[COL_ID];
        // Multiword token ranges and empty nodes carry no tree edge
        if id_field.contains('-') || id_field.contains('.') {
            return Ok(());
        }

        let local_id: usize = id_field
            .parse()
            .map_err(|_| malformed(line_no, format!("invalid ID '{id_field}'")))?;
        let expected = self.tokens.len() - self.sentence_start + 1;
        if local_id != expected {
            return Err(malformed(
                line_no,
                format!("expected word ID {expected}, found {local_id}"),
            ));
        }

        let head_field = fields[COL_HEAD];
        let local_head: usize = head_field
            .parse()
            .map_err(|_| malformed(line_no, format!("invalid HEAD '{head_field}'")))?;

        let id = TokenId(self.tokens.len());
        let head = if local_head == 0 {
            id
        } else {
            self.sentence_start
                .checked_add(local_head - 1)
                .map(TokenId)
                .ok_or_else(|| {
                    malformed(line_no, format!("HEAD {local_head} is out of range"))
                })?
        };

        let space_after = !fields[COL_MISC]
            .split('|')
            .any(|entry| entry == "SpaceAfter=No");

        self.tokens.push(Token {
            id,
            text: fields[COL_FORM].to_string(),
            pos: PartOfSpeech::from_tag(fields[COL_UPOS]),
            dep: DepLabel::from_label(fields[COL_DEPREL]),
            head,
            space_after,
        });
        Ok(())
    }

    /// Close the current sentence, checking heads stay inside it
    fn finish_sentence(&mut self, line_no: usize) -> Result<()> {
        let end = self.tokens.len();
        if let Some(token) = self.tokens[self.sentence_start..]
            .iter()
            .find(|t| t.head.index() >= end)
        {
            return Err(malformed(
                line_no,
                format!(
                    "word '{}' points to head {} outside its sentence",
                    token.text,
                    token.head.index() - self.sentence_start + 1
                ),
            ));
        }
        if let Some(last) = self.tokens.last_mut() {
            last.space_after = true;
        }
        self.sentence_start = end;
        Ok(())
    }
}

fn malformed(line: usize, message: String) -> ParserError {
    ParserError::MalformedRow { line, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_SENTENCES: &str = "\
# sent_id = 1
# text = John F. Kennedy married Jacqueline.
1\tJohn\tJohn\tPROPN\tNNP\t_\t3\tcompound\t_\t_
2\tF.\tF.\tPROPN\tNNP\t_\t3\tcompound\t_\t_
3\tKennedy\tKennedy\tPROPN\tNNP\t_\t4\tnsubj\t_\t_
4\tmarried\tmarry\tVERB\tVBD\t_\t0\tROOT\t_\t_
5\tJacqueline\tJacqueline\tPROPN\tNNP\t_\t4\tdobj\t_\tSpaceAfter=No
6\t.\t.\tPUNCT\t.\t_\t4\tpunct\t_\t_

# sent_id = 2
1\tHe\the\tPRON\tPRP\t_\t2\tnsubj\t_\t_
2\tdied\tdie\tVERB\tVBD\t_\t0\tROOT\t_\tSpaceAfter=No
3\t.\t.\tPUNCT\t.\t_\t2\tpunct\t_\tSpaceAfter=No
";

    #[test]
    fn test_loads_tokens_and_tags() {
        let doc = ConlluLoader.load_str(TWO_SENTENCES).unwrap();
        assert_eq!(doc.len(), 9);

        let kennedy = doc.token(TokenId(2));
        assert_eq!(kennedy.text, "Kennedy");
        assert_eq!(kennedy.pos, PartOfSpeech::ProperNoun);
        assert_eq!(kennedy.dep, DepLabel::NominalSubject);
        assert_eq!(doc.head_of(kennedy).text, "married");
    }

    #[test]
    fn test_rebases_heads_per_sentence() {
        let doc = ConlluLoader.load_str(TWO_SENTENCES).unwrap();

        let married = doc.token(TokenId(3));
        assert!(married.is_root());

        // "He" is word 1 of sentence 2, attached to local word 2 ("died")
        let he = doc.token(TokenId(6));
        assert_eq!(he.head, TokenId(7));
        assert!(doc.token(TokenId(7)).is_root());
    }

    #[test]
    fn test_reconstructs_spacing() {
        let doc = ConlluLoader.load_str(TWO_SENTENCES).unwrap();
        assert_eq!(
            doc.text(),
            "John F. Kennedy married Jacqueline. He died."
        );
    }

    #[test]
    fn test_skips_multiword_and_empty_nodes() {
        let content = "\
1-2\tdon't\t_\t_\t_\t_\t_\t_\t_\t_
1\tdo\tdo\tAUX\tVBP\t_\t3\taux\t_\tSpaceAfter=No
2\tn't\tnot\tPART\tRB\t_\t3\tneg\t_\t_
2.1\tgo\tgo\tVERB\t_\t_\t_\t_\t_\t_
3\tgo\tgo\tVERB\tVB\t_\t0\tROOT\t_\t_
";
        let doc = ConlluLoader.load_str(content).unwrap();
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.text(), "don't go");
    }

    #[test]
    fn test_reports_line_of_bad_row() {
        let content = "1\tDan\tDan\tPROPN\tNNP\t_\t0\tROOT\t_\t_\n2\tlikes\tVERB\n";
        match ConlluLoader.load_str(content) {
            Err(ParserError::MalformedRow { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected malformed row, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_head_outside_sentence() {
        let content = "1\tDan\tDan\tPROPN\tNNP\t_\t5\tnsubj\t_\t_\n";
        assert!(matches!(
            ConlluLoader.load_str(content),
            Err(ParserError::MalformedRow { .. })
        ));
    }

    #[test]
    fn test_rejects_overflowing_head_in_later_sentence() {
        let content = format!(
            "1\tDan\tDan\tPROPN\tNNP\t_\t2\tnsubj\t_\t_\n\
             2\tlikes\tlike\tVERB\tVBZ\t_\t0\tROOT\t_\t_\n\
             3\tDavid\tDavid\tPROPN\tNNP\t_\t2\tdobj\t_\t_\n\
             \n\
             1\tDan\tDan\tPROPN\tNNP\t_\t{}\tnsubj\t_\t_\n",
            usize::MAX
        );
        match ConlluLoader.load_str(&content) {
            Err(ParserError::MalformedRow { line, message }) => {
                assert_eq!(line, 5);
                assert!(message.contains("out of range"));
            }
            other => panic!("expected malformed row, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unparsed_head() {
        let content = "1\tDan\tDan\tPROPN\tNNP\t_\t_\t_\t_\t_\n";
        assert!(ConlluLoader.load_str(content).is_err());
    }

    #[test]
    fn test_empty_input_is_empty_document() {
        let doc = ConlluLoader.load_str("").unwrap();
        assert!(doc.is_empty());
    }
}
