use crate::index::{RuleIndex, RuleIndexBuilder};
use crate::parse::{parse_input, parse_line, ParsedLine, TermParser, TRIGGER_SUFFIX};
use crate::types::{CompileError, Input, Instruction, Instructions, Properties};

/// Prefix marking a property line inside a rule block.
const PROPERTY_PREFIX: char = '@';

/// Prefix marking a comment line.
const COMMENT_PREFIX: char = '#';

/// One rule block under construction: the trigger plus everything read
/// since it.
struct Block {
    line: usize,
    trigger_text: String,
    input: Input,
    instructions: Vec<Instruction>,
    id: Option<String>,
    properties: Properties,
}

impl Block {
    fn new(line: usize, trigger_text: &str, input: Input) -> Self {
        Self {
            line,
            trigger_text: trigger_text.to_owned(),
            input,
            instructions: Vec::new(),
            id: None,
            properties: Properties::new(),
        }
    }

    fn set_property(&mut self, key: String, value: String) {
        if key == Instructions::ID_PROPERTY {
            self.id = Some(value);
        } else {
            self.properties.set(key, value);
        }
    }
}

/// Compile rules text, aborting on the first malformed line.
pub(crate) fn compile(text: &str, term_parser: &dyn TermParser) -> Result<RuleIndex, CompileError> {
    let (index, errors) = compile_lossy(text, term_parser);
    match errors.into_iter().next() {
        Some(err) => Err(err),
        None => Ok(index),
    }
}

/// Compile rules text, indexing every well-formed block and collecting one
/// diagnostic per offending line. A block whose trigger line fails swallows
/// its remaining lines, so one typo reports once instead of cascading.
pub(crate) fn compile_lossy(
    text: &str,
    term_parser: &dyn TermParser,
) -> (RuleIndex, Vec<CompileError>) {
    let mut builder = RuleIndex::builder();
    let mut errors = Vec::new();
    let mut current: Option<Block> = None;
    let mut skipping_block = false;
    let mut ord = 0;

    for (number, raw) in text.lines().enumerate() {
        let line_no = number + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
            continue;
        }

        if line.ends_with(TRIGGER_SUFFIX) {
            flush(current.take(), &mut builder, &mut errors, &mut ord);
            let trigger_text = line[..line.len() - TRIGGER_SUFFIX.len()].trim();
            match parse_input(trigger_text) {
                Ok(input) => {
                    current = Some(Block::new(line_no, trigger_text, input));
                    skipping_block = false;
                }
                Err(err) => {
                    errors.push(CompileError::InvalidLine {
                        line: line_no,
                        content: line.to_owned(),
                        message: err.message().to_owned(),
                    });
                    skipping_block = true;
                }
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix(PROPERTY_PREFIX) {
            match current.as_mut() {
                Some(block) => match parse_property(rest) {
                    Ok((key, value)) => block.set_property(key, value),
                    Err(message) => errors.push(CompileError::InvalidLine {
                        line: line_no,
                        content: line.to_owned(),
                        message,
                    }),
                },
                None => {
                    if !skipping_block {
                        errors.push(CompileError::MissingTrigger {
                            line: line_no,
                            content: line.to_owned(),
                        });
                    }
                }
            }
            continue;
        }

        match current.as_mut() {
            Some(block) => match parse_line(line, Some(&block.input), term_parser) {
                Ok(ParsedLine::Instruction(instruction)) => block.instructions.push(instruction),
                // Trigger lines were handled above.
                Ok(ParsedLine::Input(_)) => {}
                Err(err) => errors.push(CompileError::InvalidLine {
                    line: line_no,
                    content: line.to_owned(),
                    message: err.message().to_owned(),
                }),
            },
            None => {
                if !skipping_block {
                    errors.push(CompileError::MissingTrigger {
                        line: line_no,
                        content: line.to_owned(),
                    });
                }
            }
        }
    }
    flush(current.take(), &mut builder, &mut errors, &mut ord);

    match builder.build() {
        Ok(index) => (index, errors),
        Err(err) => {
            errors.push(err);
            (RuleIndex::default(), errors)
        }
    }
}

fn flush(
    block: Option<Block>,
    builder: &mut RuleIndexBuilder,
    errors: &mut Vec<CompileError>,
    ord: &mut usize,
) {
    let Some(block) = block else {
        return;
    };
    if block.instructions.is_empty() {
        errors.push(CompileError::EmptyRule {
            line: block.line,
            trigger: block.trigger_text,
        });
        return;
    }
    let id = block
        .id
        .unwrap_or_else(|| format!("{}#{}", block.trigger_text, *ord));
    let instructions =
        Instructions::new(*ord, id, block.instructions).with_properties(block.properties);
    let taken = std::mem::take(builder);
    *builder = taken.insert(block.input, instructions);
    *ord += 1;
}

/// Parse the `key: value` remainder of an `@` property line.
fn parse_property(rest: &str) -> Result<(String, String), String> {
    let Some((key, value)) = rest.split_once(':') else {
        return Err("expected ':' in property line".to_owned());
    };
    let key = key.trim();
    if key.is_empty() {
        return Err("property key must not be empty".to_owned());
    }
    if !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!(
            "property key contains a character that is not allowed: '{key}'"
        ));
    }
    Ok((key.to_owned(), value.trim().to_owned()))
}

#[cfg(test)]
mod tests {
    use crate::index::RuleIndex;
    use crate::types::{CompileError, Instruction, QueryToken};

    fn tokens(text: &str) -> Vec<QueryToken> {
        text.split_whitespace().map(QueryToken::new).collect()
    }

    #[test]
    fn single_block() {
        let index = RuleIndex::from_rules(
            "running shoe* =>\n\
             \tFILTER: sports\n",
        )
        .unwrap();
        assert_eq!(index.len(), 1);
        let matches = index.matches(&tokens("running shoes"));
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].instructions().id(), "running shoe*#0");
    }

    #[test]
    fn multiple_blocks_get_sequential_ords() {
        let index = RuleIndex::from_rules(
            "a =>\n\
             \tUP(2): x\n\
             b =>\n\
             \tDOWN(2): y\n",
        )
        .unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.matches(&tokens("a"))[0].instructions().ord(), 0);
        assert_eq!(index.matches(&tokens("b"))[0].instructions().ord(), 1);
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let index = RuleIndex::from_rules(
            "# a comment\n\
             \n\
             a =>\n\
             \t# another comment\n\
             \tDELETE:\n\
             \n",
        )
        .unwrap();
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn id_property_overrides_default_id() {
        let index = RuleIndex::from_rules(
            "a =>\n\
             \t@_id: my-rule\n\
             \tFILTER: x\n",
        )
        .unwrap();
        let matches = index.matches(&tokens("a"));
        assert_eq!(matches[0].instructions().id(), "my-rule");
    }

    #[test]
    fn log_and_custom_properties() {
        let index = RuleIndex::from_rules(
            "a =>\n\
             \t@_log: fired rule a\n\
             \t@group: promo\n\
             \tFILTER: x\n",
        )
        .unwrap();
        let matches = index.matches(&tokens("a"));
        let instructions = matches[0].instructions();
        assert_eq!(instructions.property("_log"), Some("fired rule a"));
        assert_eq!(instructions.property("group"), Some("promo"));
    }

    #[test]
    fn shared_id_across_triggers() {
        let index = RuleIndex::from_rules(
            "notebook =>\n\
             \t@_id: laptops\n\
             \tUP(10): laptop\n\
             netbook =>\n\
             \t@_id: laptops\n\
             \tUP(10): laptop\n",
        )
        .unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(
            index.matches(&tokens("notebook"))[0].instructions().id(),
            index.matches(&tokens("netbook"))[0].instructions().id()
        );
    }

    #[test]
    fn instruction_before_any_trigger_is_an_error() {
        let err = RuleIndex::from_rules("FILTER: x\n").unwrap_err();
        assert_eq!(
            err,
            CompileError::MissingTrigger {
                line: 1,
                content: "FILTER: x".to_owned(),
            }
        );
    }

    #[test]
    fn trigger_without_instructions_is_an_error() {
        let err = RuleIndex::from_rules("a =>\nb =>\n\tFILTER: x\n").unwrap_err();
        assert_eq!(
            err,
            CompileError::EmptyRule {
                line: 1,
                trigger: "a".to_owned(),
            }
        );
    }

    #[test]
    fn trailing_trigger_without_instructions_is_an_error() {
        let err = RuleIndex::from_rules("a =>\n\tFILTER: x\nb =>\n").unwrap_err();
        assert!(matches!(err, CompileError::EmptyRule { line: 3, .. }));
    }

    #[test]
    fn malformed_line_reports_line_number_and_content() {
        let err = RuleIndex::from_rules("a =>\n\tBOOST: x\n").unwrap_err();
        assert_eq!(
            err,
            CompileError::InvalidLine {
                line: 2,
                content: "BOOST: x".to_owned(),
                message: "cannot parse line: 'BOOST: x'".to_owned(),
            }
        );
        assert_eq!(
            err.to_string(),
            "line 2: cannot parse line: 'BOOST: x': 'BOOST: x'"
        );
    }

    #[test]
    fn malformed_trigger_reports_error() {
        let err = RuleIndex::from_rules("a* b =>\n\tFILTER: x\n").unwrap_err();
        assert!(matches!(err, CompileError::InvalidLine { line: 1, .. }));
    }

    #[test]
    fn lossy_compile_keeps_good_blocks() {
        let (index, errors) = RuleIndex::from_rules_lossy(
            "a =>\n\
             \tFILTER: x\n\
             a* b =>\n\
             \tFILTER: y\n\
             c =>\n\
             \tFILTER: z\n",
        );
        assert_eq!(index.len(), 2);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], CompileError::InvalidLine { line: 3, .. }));
        assert_eq!(index.matches(&tokens("c")).len(), 1);
    }

    #[test]
    fn lossy_compile_does_not_cascade_after_bad_trigger() {
        let (index, errors) = RuleIndex::from_rules_lossy(
            "a* b =>\n\
             \tFILTER: y\n\
             \t@_id: whatever\n\
             c =>\n\
             \tFILTER: z\n",
        );
        assert_eq!(index.len(), 1);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn lossy_compile_skips_bad_instruction_but_keeps_block() {
        let (index, errors) = RuleIndex::from_rules_lossy(
            "a =>\n\
             \tFILTER: x\n\
             \tDECORATE(bad-key): v\n",
        );
        assert_eq!(index.len(), 1);
        assert_eq!(errors.len(), 1);
        let matches = index.matches(&tokens("a"));
        assert_eq!(matches[0].instructions().len(), 1);
    }

    #[test]
    fn malformed_property_line_is_an_error() {
        let err = RuleIndex::from_rules("a =>\n\t@nocolon\n\tFILTER: x\n").unwrap_err();
        assert!(matches!(err, CompileError::InvalidLine { line: 2, .. }));
        let err = RuleIndex::from_rules("a =>\n\t@bad key: v\n\tFILTER: x\n").unwrap_err();
        assert!(matches!(err, CompileError::InvalidLine { line: 2, .. }));
    }

    #[test]
    fn delete_uses_its_own_trigger() {
        let index = RuleIndex::from_rules(
            "cheap notebook =>\n\
             \tDELETE: cheap\n",
        )
        .unwrap();
        let matches = index.matches(&tokens("cheap notebook deals"));
        assert_eq!(matches.len(), 1);
        match &matches[0].instructions().iter().next().unwrap() {
            Instruction::Delete { terms } => assert_eq!(terms[0].content(), "cheap"),
            other => panic!("expected delete, got {other:?}"),
        }
    }

    #[test]
    fn empty_rules_text_compiles_to_empty_index() {
        let index = RuleIndex::from_rules("").unwrap();
        assert!(index.is_empty());
        assert!(index.matches(&tokens("anything")).is_empty());
    }
}
