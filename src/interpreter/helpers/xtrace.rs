//! xtrace (set -x) rendering
//!
//! Renders a command node as the trace line bash prints before running it
//! when the xtrace option is enabled. PS4 controls the prefix (default "+ ").
//!
//! Only a few node kinds are traced: simple commands, for/select loops,
//! case and let. Every other kind, and any shape inside a traced kind that
//! cannot be rendered exactly, produces no line at all. A missing trace
//! line is acceptable, a wrong one is not.

use std::collections::HashMap;

use crate::ast::types::*;
use crate::interpreter::errors::TraceSkip;
use crate::interpreter::helpers::quoting::LangVariant;
use crate::interpreter::printer::Printable;
use crate::interpreter::runtime::{SyntaxFormatter, TraceSink, WordEvaluator};
use crate::interpreter::types::ShellOptions;

/// Default PS4 value when not set
pub const DEFAULT_PS4: &str = "+ ";

/// Get the xtrace prefix from PS4 variable.
/// Unset PS4 gives the default, an empty PS4 gives no prefix.
pub fn get_xtrace_prefix(env: &HashMap<String, String>) -> String {
    match env.get("PS4") {
        None => DEFAULT_PS4.to_string(),
        Some(ps4) if ps4.is_empty() => String::new(),
        Some(ps4) => ps4.clone(),
    }
}

/// Trace renderer bound to its collaborators for one or more commands.
pub struct XTrace<'a> {
    evaluator: &'a mut dyn WordEvaluator,
    syntax: &'a dyn SyntaxFormatter,
    lang: LangVariant,
    prefix: String,
}

impl<'a> XTrace<'a> {
    pub fn new(evaluator: &'a mut dyn WordEvaluator, syntax: &'a dyn SyntaxFormatter) -> Self {
        Self {
            evaluator,
            syntax,
            lang: LangVariant::Bash,
            prefix: DEFAULT_PS4.to_string(),
        }
    }

    /// Quoting dialect for quoted trace output
    pub fn with_lang(mut self, lang: LangVariant) -> Self {
        self.lang = lang;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Render the trace line for `node`, including prefix and newline.
    pub fn render(&mut self, node: &CommandNode, enabled: bool) -> Result<String, TraceSkip> {
        if !enabled {
            return Err(TraceSkip::Disabled);
        }

        let mut b = String::new();
        b.push_str(&self.prefix);

        match node {
            CommandNode::Call(call) => self.render_call(&mut b, call)?,
            CommandNode::For(for_node) => self.render_for(&mut b, for_node)?,
            CommandNode::Case(case_node) => {
                b.push_str("case ");
                self.syntax.print(&mut b, Printable::Word(&case_node.word));
                // patterns are never traced
                b.push_str(" in");
            }
            CommandNode::Let(let_node) => self.render_let(&mut b, let_node)?,
            CommandNode::If(_)
            | CommandNode::While(_)
            | CommandNode::ArithmeticCommand(_)
            | CommandNode::Test(_)
            | CommandNode::Declaration(_)
            | CommandNode::Time(_)
            | CommandNode::Subshell(_)
            | CommandNode::Group(_)
            | CommandNode::FunctionDef(_)
            | CommandNode::Binary(_) => return Err(TraceSkip::UnsupportedCommand(node.kind())),
        }

        b.push('\n');
        Ok(b)
    }

    /// Render and write the trace line to `sink`.
    /// Returns whether a line was written.
    pub fn trace(&mut self, node: &CommandNode, enabled: bool, sink: &mut dyn TraceSink) -> bool {
        match self.render(node, enabled) {
            Ok(line) => {
                sink.write(&line);
                true
            }
            // skipped lines leave no record
            Err(_) => false,
        }
    }

    fn render_call(&mut self, b: &mut String, call: &CallNode) -> Result<(), TraceSkip> {
        if let Some((name_word, rest)) = call.args.split_first() {
            let name = name_word.lit();
            let fields = self.evaluator.fields(rest);
            let s = fields.join(" ");

            if s.trim().is_empty() {
                // fields are empty for `name() {}` declarations
                b.push_str(name);
            } else if name == "set" {
                // arguments to the builtin 'set' are never quoted
                b.push_str(name);
                b.push(' ');
                b.push_str(&s);
            } else {
                let qs = self.syntax.quote(&s, self.lang)?;
                b.push_str(name);
                b.push(' ');
                b.push_str(&qs);
            }
        }

        for assignment in &call.assignments {
            if assignment.array.is_some() {
                self.syntax.print(b, Printable::Call(call));
            } else if let Some(value) = &assignment.value {
                for part in &value.parts {
                    match part {
                        WordPart::ArithmeticExpansion(_) => {
                            let n = self.evaluator.arithm(value);
                            b.push_str(&format!("{}={}", assignment.name, n));
                        }
                        WordPart::DoubleQuoted(_) => {
                            // bash traces double-quoted values in single quotes
                            let literal = self.evaluator.literal(value);
                            let qs = self.syntax.quote(&literal, self.lang)?;
                            b.push_str(&format!("{}={}", assignment.name, qs));
                        }
                        WordPart::SingleQuoted(_) | WordPart::Literal(_) => {
                            self.syntax.print(b, Printable::Call(call));
                        }
                        WordPart::ParameterExpansion(_)
                        | WordPart::CommandSubstitution(_)
                        | WordPart::ProcessSubstitution(_)
                        | WordPart::ExtendedGlob(_)
                        | WordPart::BraceExpansion(_) => {
                            return Err(TraceSkip::UnsupportedWordPart {
                                name: assignment.name.clone(),
                                part: part.kind(),
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn render_for(&mut self, b: &mut String, node: &ForNode) -> Result<(), TraceSkip> {
        match &node.iteration {
            ForIteration::Words(iter) => {
                // items are quoted for 'for' but not for 'select'
                if node.select {
                    b.push_str("select ");
                    for item in &iter.items {
                        self.syntax.print(b, Printable::Word(item));
                        b.push(' ');
                    }
                } else {
                    if iter.in_pos.is_none() {
                        return Err(TraceSkip::MissingIn);
                    }
                    b.push_str("for ");
                    b.push_str(&iter.variable);
                    // all items share one pair of single quotes
                    b.push_str(" in '");
                    for item in &iter.items {
                        self.syntax.print(b, Printable::Word(item));
                    }
                    b.push('\'');
                }
                Ok(())
            }
            ForIteration::CStyle(_) => Err(TraceSkip::CStyleLoop),
        }
    }

    fn render_let(&mut self, b: &mut String, node: &LetNode) -> Result<(), TraceSkip> {
        for expr in &node.expressions {
            match expr {
                ArithExpr::Word(word) => {
                    let literal = self.evaluator.literal(word);
                    let qs = self.syntax.quote(&literal, self.lang)?;
                    b.push_str(&format!("let {}", qs));
                }
                ArithExpr::Binary(_) | ArithExpr::Unary(_) | ArithExpr::Group(_) => {
                    self.syntax.print(b, Printable::Let(node));
                }
            }
        }
        Ok(())
    }
}

/// Render the trace line for `node` under the given shell options,
/// with the default prefix.
pub fn render_trace(
    node: &CommandNode,
    options: &ShellOptions,
    evaluator: &mut dyn WordEvaluator,
    syntax: &dyn SyntaxFormatter,
) -> Result<String, TraceSkip> {
    XTrace::new(evaluator, syntax)
        .with_lang(options.lang())
        .render(node, options.xtrace)
}

/// Generate xtrace output for a command about to run.
/// Writes at most one line to `sink`, prefixed with PS4 from `env`.
pub fn trace_command(
    node: &CommandNode,
    options: &ShellOptions,
    env: &HashMap<String, String>,
    evaluator: &mut dyn WordEvaluator,
    syntax: &dyn SyntaxFormatter,
    sink: &mut dyn TraceSink,
) -> bool {
    if !options.xtrace {
        return false;
    }

    XTrace::new(evaluator, syntax)
        .with_lang(options.lang())
        .with_prefix(get_xtrace_prefix(env))
        .trace(node, true, sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::errors::QuoteError;
    use crate::interpreter::printer;
    use crate::interpreter::runtime::{BashSyntax, StaticRuntime};

    /// Evaluator returning each word's own text, counting calls
    #[derive(Default)]
    struct FakeEvaluator {
        arithm_result: i64,
        calls: usize,
    }

    fn word_text(word: &WordNode) -> String {
        let mut text = String::new();
        for part in &word.parts {
            match part {
                WordPart::Literal(LiteralPart { value })
                | WordPart::SingleQuoted(SingleQuotedPart { value, .. }) => text.push_str(value),
                WordPart::DoubleQuoted(DoubleQuotedPart { parts, .. }) => {
                    text.push_str(&word_text(&WordNode { parts: parts.clone() }))
                }
                _ => {}
            }
        }
        text
    }

    impl WordEvaluator for FakeEvaluator {
        fn fields(&mut self, words: &[WordNode]) -> Vec<String> {
            self.calls += 1;
            words.iter().map(word_text).collect()
        }
        fn literal(&mut self, word: &WordNode) -> String {
            self.calls += 1;
            word_text(word)
        }
        fn arithm(&mut self, _word: &WordNode) -> i64 {
            self.calls += 1;
            self.arithm_result
        }
    }

    /// Quotes with double quotes and refuses anything containing "BAD"
    struct FakeSyntax;

    impl SyntaxFormatter for FakeSyntax {
        fn quote(&self, s: &str, _lang: LangVariant) -> Result<String, QuoteError> {
            if s.contains("BAD") {
                return Err(QuoteError::new(0, "refused"));
            }
            Ok(format!("\"{}\"", s))
        }
        fn print(&self, out: &mut String, node: Printable<'_>) {
            printer::print(out, node);
        }
    }

    fn render_with(node: &CommandNode, syntax: &dyn SyntaxFormatter) -> Result<String, TraceSkip> {
        let mut evaluator = FakeEvaluator { arithm_result: 3, calls: 0 };
        XTrace::new(&mut evaluator, syntax).render(node, true)
    }

    fn render(node: &CommandNode) -> Result<String, TraceSkip> {
        render_with(node, &BashSyntax)
    }

    fn cmd(args: &[&str]) -> CommandNode {
        AST::call(vec![], args.iter().map(|a| AST::lit_word(*a)).collect())
    }

    fn assign(name: &str, parts: Vec<WordPart>) -> CommandNode {
        AST::call(vec![AST::assignment(name, Some(AST::word(parts)))], vec![])
    }

    fn param(name: &str) -> WordNode {
        AST::word(vec![AST::parameter_expansion(name, None)])
    }

    #[test]
    fn test_get_xtrace_prefix_default() {
        assert_eq!(get_xtrace_prefix(&HashMap::new()), "+ ");
    }

    #[test]
    fn test_get_xtrace_prefix_custom() {
        let mut env = HashMap::new();
        env.insert("PS4".to_string(), ">> ".to_string());
        assert_eq!(get_xtrace_prefix(&env), ">> ");
    }

    #[test]
    fn test_get_xtrace_prefix_empty() {
        let mut env = HashMap::new();
        env.insert("PS4".to_string(), String::new());
        assert_eq!(get_xtrace_prefix(&env), "");
    }

    #[test]
    fn test_disabled_produces_nothing() {
        let mut evaluator = FakeEvaluator::default();
        let mut sink = String::new();
        let written = XTrace::new(&mut evaluator, &BashSyntax).trace(&cmd(&["echo", "hi"]), false, &mut sink);
        assert!(!written);
        assert!(sink.is_empty());
        assert_eq!(evaluator.calls, 0);
    }

    #[test]
    fn test_trace_command_disabled_option() {
        let mut evaluator = FakeEvaluator::default();
        let mut sink: Vec<String> = Vec::new();
        let options = ShellOptions::default();
        let written = trace_command(
            &cmd(&["echo", "hi"]),
            &options,
            &HashMap::new(),
            &mut evaluator,
            &BashSyntax,
            &mut sink,
        );
        assert!(!written);
        assert!(sink.is_empty());
        assert_eq!(evaluator.calls, 0);
    }

    #[test]
    fn test_call_quotes_joined_fields() {
        let node = cmd(&["cmd", "a", "b"]);
        assert_eq!(render_with(&node, &FakeSyntax).unwrap(), "+ cmd \"a b\"\n");
        assert_eq!(render(&node).unwrap(), "+ cmd 'a b'\n");
    }

    #[test]
    fn test_call_single_safe_argument() {
        assert_eq!(render(&cmd(&["echo", "hello"])).unwrap(), "+ echo hello\n");
    }

    #[test]
    fn test_set_arguments_are_not_quoted() {
        assert_eq!(render(&cmd(&["set", "-e", "-x"])).unwrap(), "+ set -e -x\n");
    }

    #[test]
    fn test_call_without_arguments() {
        assert_eq!(render(&cmd(&["funcName"])).unwrap(), "+ funcName\n");
        // whitespace-only fields count as empty
        assert_eq!(render(&cmd(&["funcName", " ", ""])).unwrap(), "+ funcName\n");
    }

    #[test]
    fn test_call_quote_failure_skips() {
        let node = cmd(&["echo", "BAD"]);
        assert!(matches!(render_with(&node, &FakeSyntax), Err(TraceSkip::Quote(_))));

        let node = cmd(&["echo", "a\0b"]);
        assert!(matches!(render(&node), Err(TraceSkip::Quote(_))));
    }

    #[test]
    fn test_arithmetic_assignment() {
        let expr = AST::arith_binary(ArithBinaryOperator::Add, AST::arith_word("1"), AST::arith_word("2"));
        let node = assign("x", vec![AST::arithmetic_expansion(expr)]);
        assert_eq!(render(&node).unwrap(), "+ x=3\n");

        let mut runtime = StaticRuntime::new();
        let line = render_trace(
            &node,
            &ShellOptions { xtrace: true, posix: false },
            &mut runtime,
            &BashSyntax,
        );
        assert_eq!(line.unwrap(), "+ x=3\n");
    }

    #[test]
    fn test_double_quoted_assignment_uses_single_quotes() {
        let node = assign("x", vec![AST::double_quoted(vec![AST::literal("a b")])]);
        assert_eq!(render(&node).unwrap(), "+ x='a b'\n");
    }

    #[test]
    fn test_double_quoted_assignment_quote_failure() {
        let node = assign("x", vec![AST::double_quoted(vec![AST::literal("BAD")])]);
        assert!(matches!(render_with(&node, &FakeSyntax), Err(TraceSkip::Quote(_))));
    }

    #[test]
    fn test_literal_assignment_prints_verbatim() {
        let node = assign("x", vec![AST::single_quoted("a b")]);
        assert_eq!(render(&node).unwrap(), "+ x='a b'\n");

        let node = assign("x", vec![AST::literal("plain")]);
        assert_eq!(render(&node).unwrap(), "+ x=plain\n");
    }

    #[test]
    fn test_array_assignment_prints_verbatim() {
        let node = AST::call(
            vec![AST::array_assignment("arr", vec![AST::lit_word("a"), AST::lit_word("b")])],
            vec![],
        );
        assert_eq!(render(&node).unwrap(), "+ arr=(a b)\n");
    }

    #[test]
    fn test_unsupported_assignment_parts_skip() {
        let mut evaluator = FakeEvaluator::default();
        let mut sink = String::new();
        let node = assign("x", vec![AST::parameter_expansion("y", None)]);
        let written = XTrace::new(&mut evaluator, &BashSyntax).trace(&node, true, &mut sink);
        assert!(!written);
        assert!(sink.is_empty());
        assert_eq!(
            render(&node),
            Err(TraceSkip::UnsupportedWordPart { name: "x".to_string(), part: "parameter expansion" })
        );

        let unsupported = vec![
            AST::command_substitution(vec![cmd(&["date"])], false),
            WordPart::ProcessSubstitution(ProcessSubstitutionPart {
                direction: ProcessDirection::Input,
                body: vec![cmd(&["ls"])],
            }),
            WordPart::ExtendedGlob(ExtendedGlobPart {
                operator: GlobOperator::ZeroOrMore,
                pattern: "a".to_string(),
            }),
            WordPart::BraceExpansion(BraceExpansionPart {
                sequence: false,
                elements: vec![AST::lit_word("a"), AST::lit_word("b")],
            }),
        ];
        for part in unsupported {
            let node = assign("x", vec![part]);
            assert!(matches!(render(&node), Err(TraceSkip::UnsupportedWordPart { .. })));
        }
    }

    #[test]
    fn test_for_items_share_one_quote_pair() {
        let node = AST::for_words(
            "i",
            vec![AST::lit_word("a"), AST::lit_word("b"), AST::lit_word("c")],
            vec![cmd(&["echo"])],
        );
        assert_eq!(render(&node).unwrap(), "+ for i in 'abc'\n");
    }

    #[test]
    fn test_for_without_in_skips() {
        let node = CommandNode::For(ForNode {
            select: false,
            iteration: ForIteration::Words(WordIterationNode {
                variable: "i".to_string(),
                in_pos: None,
                items: vec![],
            }),
            body: vec![],
        });
        assert_eq!(render(&node), Err(TraceSkip::MissingIn));
    }

    #[test]
    fn test_select_items_unquoted() {
        let node = AST::select_words("i", vec![AST::lit_word("a"), AST::lit_word("b")], vec![]);
        assert_eq!(render(&node).unwrap(), "+ select a b \n");
    }

    #[test]
    fn test_cstyle_for_skips() {
        let node = CommandNode::For(ForNode {
            select: false,
            iteration: ForIteration::CStyle(CStyleLoopNode::default()),
            body: vec![],
        });
        assert_eq!(render(&node), Err(TraceSkip::CStyleLoop));
    }

    #[test]
    fn test_case_omits_patterns() {
        let node = AST::case_node(
            param("x"),
            vec![AST::case_item(vec![AST::lit_word("a")], vec![cmd(&["echo", "a"])])],
        );
        assert_eq!(render(&node).unwrap(), "+ case $x in\n");
    }

    #[test]
    fn test_let_word_is_quoted() {
        let node = AST::let_node(vec![ArithExpr::Word(AST::word(vec![AST::double_quoted(vec![
            AST::literal("x=1"),
        ])]))]);
        assert_eq!(render(&node).unwrap(), "+ let 'x=1'\n");
    }

    #[test]
    fn test_let_expression_prints_verbatim() {
        let node = AST::let_node(vec![AST::arith_binary(
            ArithBinaryOperator::Assign,
            AST::arith_word("x"),
            AST::arith_binary(ArithBinaryOperator::Add, AST::arith_word("1"), AST::arith_word("2")),
        )]);
        assert_eq!(render(&node).unwrap(), "+ let x=1+2\n");
    }

    #[test]
    fn test_let_quote_failure_skips() {
        let node = AST::let_node(vec![AST::arith_word("BAD")]);
        assert!(matches!(render_with(&node, &FakeSyntax), Err(TraceSkip::Quote(_))));
    }

    #[test]
    fn test_excluded_kinds_produce_nothing() {
        let body = vec![cmd(&["true"])];
        let nodes = vec![
            CommandNode::If(IfNode {
                clauses: vec![IfClause { condition: body.clone(), body: body.clone() }],
                else_body: None,
            }),
            CommandNode::While(WhileNode { until: false, condition: body.clone(), body: body.clone() }),
            CommandNode::ArithmeticCommand(ArithmeticCommandNode { expression: AST::arith_word("1") }),
            CommandNode::Test(TestNode { words: vec![AST::lit_word("-n"), AST::lit_word("x")] }),
            CommandNode::Declaration(DeclarationNode {
                variant: "declare".to_string(),
                args: vec![AST::assignment("x", Some(AST::lit_word("1")))],
            }),
            CommandNode::Time(TimeNode { posix: false, command: Some(Box::new(cmd(&["sleep", "1"]))) }),
            CommandNode::Subshell(SubshellNode { body: body.clone() }),
            CommandNode::Group(GroupNode { body: body.clone() }),
            CommandNode::FunctionDef(FunctionDefNode {
                name: "f".to_string(),
                body: Box::new(CommandNode::Group(GroupNode { body: body.clone() })),
            }),
            CommandNode::Binary(BinaryCommandNode {
                operator: BinaryCommandOperator::And,
                left: Box::new(cmd(&["true"])),
                right: Box::new(cmd(&["false"])),
            }),
        ];

        for node in &nodes {
            let mut evaluator = FakeEvaluator::default();
            let mut sink = String::new();
            let written = XTrace::new(&mut evaluator, &BashSyntax).trace(node, true, &mut sink);
            assert!(!written, "{} should not be traced", node.kind());
            assert!(sink.is_empty());
            assert_eq!(render(node), Err(TraceSkip::UnsupportedCommand(node.kind())));
        }
    }

    #[test]
    fn test_rendering_is_repeatable() {
        let node = cmd(&["echo", "a b", "c"]);
        let mut runtime = StaticRuntime::new();
        let mut tracer = XTrace::new(&mut runtime, &BashSyntax);
        let first = tracer.render(&node, true).unwrap();
        let second = tracer.render(&node, true).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, "+ echo 'a b c'\n");
    }

    #[test]
    fn test_trace_command_uses_ps4() {
        let mut runtime = StaticRuntime::new();
        let mut sink: Vec<String> = Vec::new();
        let mut env = HashMap::new();
        env.insert("PS4".to_string(), "++ ".to_string());
        let options = ShellOptions { xtrace: true, posix: false };
        let written = trace_command(&cmd(&["ls"]), &options, &env, &mut runtime, &BashSyntax, &mut sink);
        assert!(written);
        assert_eq!(sink, vec!["++ ls\n".to_string()]);
    }

    #[test]
    fn test_posix_mode_rejects_control_characters() {
        let node = cmd(&["printf", "a\x01b"]);
        let mut runtime = StaticRuntime::new();
        let posix = ShellOptions { xtrace: true, posix: true };
        assert!(matches!(
            render_trace(&node, &posix, &mut runtime, &BashSyntax),
            Err(TraceSkip::Quote(_))
        ));

        let bash = ShellOptions { xtrace: true, posix: false };
        assert_eq!(
            render_trace(&node, &bash, &mut runtime, &BashSyntax).unwrap(),
            "+ printf $'a\\x01b'\n"
        );
    }

    #[test]
    fn test_whitespace_arguments_traced_in_both_modes() {
        let node = cmd(&["printf", "a\tb", "c\nd"]);
        let mut runtime = StaticRuntime::new();
        for posix in [false, true] {
            let options = ShellOptions { xtrace: true, posix };
            assert_eq!(
                render_trace(&node, &options, &mut runtime, &BashSyntax).unwrap(),
                "+ printf 'a\tb c\nd'\n"
            );
        }
    }

    #[test]
    fn test_brace_expansion_text_is_quoted() {
        assert_eq!(render(&cmd(&["echo", "a{b,c}"])).unwrap(), "+ echo 'a{b,c}'\n");
        assert_eq!(render(&cmd(&["echo", "coproc"])).unwrap(), "+ echo 'coproc'\n");
    }

    #[test]
    fn test_call_with_args_and_assignment_concatenates() {
        let node = AST::call(
            vec![AST::assignment(
                "x",
                Some(AST::word(vec![AST::arithmetic_expansion(AST::arith_word("3"))])),
            )],
            vec![AST::lit_word("echo"), AST::lit_word("hi")],
        );
        assert_eq!(render(&node).unwrap(), "+ echo hix=3\n");
    }

    #[test]
    fn test_let_expressions_concatenate() {
        let node = AST::let_node(vec![AST::arith_word("a"), AST::arith_word("b")]);
        assert_eq!(render(&node).unwrap(), "+ let alet b\n");

        let node = AST::let_node(vec![
            AST::arith_word("a"),
            AST::arith_binary(ArithBinaryOperator::Assign, AST::arith_word("x"), AST::arith_word("1")),
        ]);
        assert_eq!(render(&node).unwrap(), "+ let alet a x=1\n");
    }

    #[test]
    fn test_trace_to_stdout_sink() {
        let mut evaluator = FakeEvaluator::default();
        let mut out = std::io::stdout();
        assert!(XTrace::new(&mut evaluator, &BashSyntax).trace(&cmd(&["true"]), true, &mut out));
    }

    #[test]
    fn test_static_runtime_expands_fields() {
        let mut runtime = StaticRuntime::with_vars([("msg", "hello world")]);
        let node = AST::call(vec![], vec![AST::lit_word("echo"), param("msg")]);
        let line = render_trace(&node, &ShellOptions { xtrace: true, posix: false }, &mut runtime, &BashSyntax);
        assert_eq!(line.unwrap(), "+ echo 'hello world'\n");
    }
}
