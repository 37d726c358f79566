use super::lexer::{Token, tokenize};

/// A typed parameter such as `String color`. Array types use `[]` suffixes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Param {
    pub ty: &'static str,
    pub name: &'static str,
}

/// Language construct a rule requires the submission to declare.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Construct {
    /// `public class Name [extends Base] {`
    ClassHeader {
        name: &'static str,
        extends: Option<&'static str>,
    },
    /// `private Type name;` or `private Type name = ...`
    Field {
        ty: &'static str,
        name: &'static str,
    },
    /// `public Class(Type a, Type b)`
    Constructor {
        class: &'static str,
        params: &'static [Param],
    },
    /// `public [static] Ret name(Type a)`
    Method {
        is_static: bool,
        returns: &'static str,
        name: &'static str,
        params: &'static [Param],
    },
    /// Any statement or expression fragment, e.g. `this.size = size;` or `super(`.
    Statement(&'static str),
}

impl Construct {
    /// Token sequences any of which satisfies the construct.
    fn patterns(&self) -> Vec<Vec<Token>> {
        match *self {
            Self::ClassHeader { name, extends } => {
                let mut tokens = vec![Token::word("public"), Token::word("class"), Token::word(name)];
                if let Some(base) = extends {
                    tokens.push(Token::word("extends"));
                    tokens.push(Token::word(base));
                }
                tokens.push(Token::Symbol('{'));
                vec![tokens]
            }
            Self::Field { ty, name } => {
                let mut declaration = vec![Token::word("private")];
                declaration.extend(tokenize(ty));
                declaration.push(Token::word(name));

                let mut plain = declaration.clone();
                plain.push(Token::Symbol(';'));
                let mut initialized = declaration;
                initialized.push(Token::Symbol('='));
                vec![plain, initialized]
            }
            Self::Constructor { class, params } => {
                let mut tokens = vec![Token::word("public"), Token::word(class)];
                push_params(&mut tokens, params);
                vec![tokens]
            }
            Self::Method {
                is_static,
                returns,
                name,
                params,
            } => {
                let mut tokens = vec![Token::word("public")];
                if is_static {
                    tokens.push(Token::word("static"));
                }
                tokens.extend(tokenize(returns));
                tokens.push(Token::word(name));
                push_params(&mut tokens, params);
                vec![tokens]
            }
            Self::Statement(fragment) => vec![tokenize(fragment)],
        }
    }

    fn is_satisfied_by(&self, tokens: &[Token]) -> bool {
        self.patterns()
            .iter()
            .any(|pattern| contains_sequence(tokens, pattern))
    }
}

fn push_params(tokens: &mut Vec<Token>, params: &[Param]) {
    tokens.push(Token::Symbol('('));
    for (index, param) in params.iter().enumerate() {
        if index > 0 {
            tokens.push(Token::Symbol(','));
        }
        tokens.extend(tokenize(param.ty));
        tokens.push(Token::word(param.name));
    }
    tokens.push(Token::Symbol(')'));
}

fn contains_sequence(haystack: &[Token], needle: &[Token]) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.windows(needle.len()).any(|window| window == needle)
}

/// A named requirement. Failing rules report `<ID>_MISSING`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rule {
    pub id: &'static str,
    pub construct: Construct,
}

impl Rule {
    pub const fn new(id: &'static str, construct: Construct) -> Self {
        Self { id, construct }
    }

    pub fn invalidation_code(&self) -> String {
        format!("{}_MISSING", self.id)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuleReport {
    pub passed: Vec<String>,
    pub failed: Vec<String>,
}

impl RuleReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Check every rule against `source`, preserving rule order in both lists.
pub fn evaluate(rules: &[Rule], source: &str) -> RuleReport {
    let tokens = tokenize(source);
    let mut report = RuleReport::default();

    for rule in rules {
        if rule.construct.is_satisfied_by(&tokens) {
            report.passed.push(rule.id.to_owned());
        } else {
            report.failed.push(rule.invalidation_code());
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::{Construct, Param, Rule, evaluate};

    const RULES: &[Rule] = &[
        Rule::new(
            "BOX_CLASS",
            Construct::ClassHeader {
                name: "Box",
                extends: None,
            },
        ),
        Rule::new(
            "BOX_FIELD_WIDTH",
            Construct::Field {
                ty: "int",
                name: "width",
            },
        ),
    ];

    #[test]
    fn all_rules_pass() {
        let report = evaluate(RULES, "public class Box {\n  private int width;\n}");
        assert!(report.is_success());
        assert_eq!(report.passed, vec!["BOX_CLASS", "BOX_FIELD_WIDTH"]);
    }

    #[test]
    fn reports_missing_codes() {
        let report = evaluate(RULES, "public class Box { }");
        assert_eq!(report.passed, vec!["BOX_CLASS"]);
        assert_eq!(report.failed, vec!["BOX_FIELD_WIDTH_MISSING"]);
    }

    #[test]
    fn comments_and_strings_do_not_count() {
        let source = r#"
            // public class Box {
            class Other { String s = "private int width;"; }
        "#;
        let report = evaluate(RULES, source);
        assert!(report.passed.is_empty());
        assert_eq!(report.failed.len(), 2);
    }

    #[test]
    fn field_initializers_are_accepted() {
        let report = evaluate(RULES, "public class Box { private int width = 3; }");
        assert!(report.is_success());
    }

    #[test]
    fn class_header_checks_base_class() {
        let rule = [Rule::new(
            "CHILD",
            Construct::ClassHeader {
                name: "Child",
                extends: Some("Box"),
            },
        )];
        assert!(evaluate(&rule, "public class Child extends Box {}").is_success());
        assert!(!evaluate(&rule, "public class Child {}").is_success());
    }

    #[test]
    fn methods_match_signature_tokens() {
        const PARAMS: &[Param] = &[Param {
            ty: "String[]",
            name: "args",
        }];
        let rule = [Rule::new(
            "MAIN",
            Construct::Method {
                is_static: true,
                returns: "void",
                name: "main",
                params: PARAMS,
            },
        )];
        assert!(evaluate(&rule, "public static void main(String [] args) {}").is_success());
        assert!(!evaluate(&rule, "public void main(String[] args) {}").is_success());
    }

    #[test]
    fn statements_ignore_spacing() {
        let rule = [Rule::new("ASSIGN", Construct::Statement("this.width = width;"))];
        assert!(evaluate(&rule, "this.width=width ;").is_success());
    }
}
