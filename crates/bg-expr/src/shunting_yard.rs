//! Infix to postfix conversion.

use alloc::vec::Vec;

use crate::error::SyntaxError;
use crate::token::{Arity, Assoc, Token};

/// True when `top` (on the operator stack) must be emitted before `incoming` is pushed.
fn pops_before(top: Token, incoming: Token) -> bool {
    if top == Token::LeftParen {
        return false;
    }
    top.precedence() < incoming.precedence()
        || (top.precedence() == incoming.precedence() && incoming.assoc() == Assoc::Left)
}

/// Rewrite an infix token sequence into postfix order.
///
/// A `-` where an operand is expected (start of input, after `(` or an
/// operator) is read as unary minus and emitted as [`Token::Invert`].
/// The output is not validated here.
pub fn infix_to_postfix(tokens: &[Token]) -> Result<Vec<Token>, SyntaxError> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut stack: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut expect_operand = true;

    for (position, &token) in tokens.iter().enumerate() {
        let token = if token == Token::Subtract && expect_operand {
            Token::Invert
        } else {
            token
        };

        match (token, token.arity()) {
            (Token::Invalid, _) => return Err(SyntaxError::StructuralToken { position }),
            (_, Arity::Nullary) => {
                output.push(token);
                expect_operand = false;
            }
            (Token::LeftParen, _) | (_, Arity::Unary) => {
                stack.push(token);
                expect_operand = true;
            }
            (_, Arity::Binary) => {
                while let Some(&top) = stack.last() {
                    if !pops_before(top, token) {
                        break;
                    }
                    output.push(top);
                    stack.pop();
                }
                stack.push(token);
                expect_operand = true;
            }
            (Token::RightParen, _) => {
                loop {
                    match stack.pop() {
                        None => return Err(SyntaxError::MismatchedParen),
                        Some(Token::LeftParen) => break,
                        Some(top) => output.push(top),
                    }
                }
                expect_operand = false;
            }
            (_, Arity::Structural) => return Err(SyntaxError::StructuralToken { position }),
        }
    }

    while let Some(top) = stack.pop() {
        if top == Token::LeftParen {
            return Err(SyntaxError::MismatchedParen);
        }
        output.push(top);
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::postfix::validate;
    use alloc::string::String;
    use alloc::vec;

    fn convert(text: &str) -> Result<Vec<Token>, SyntaxError> {
        infix_to_postfix(&tokenize(text).unwrap().tokens)
    }

    fn postfix_text(text: &str) -> String {
        let mut out = String::new();
        for token in convert(text).unwrap() {
            if !out.is_empty() {
                out.push(' ');
            }
            match token {
                Token::Number => out.push('#'),
                other => out.push_str(other.spelling()),
            }
        }
        out
    }

    #[test]
    fn precedence_orders_operators() {
        assert_eq!(postfix_text("2+3*4"), "# # # * +");
        assert_eq!(postfix_text("2*3+4"), "# # * # +");
        assert_eq!(postfix_text("a+b<<c"), "a b + c <<");
        assert_eq!(postfix_text("a&&b||c"), "a b && c ||");
    }

    #[test]
    fn left_associative_operators() {
        assert_eq!(postfix_text("a-b-c"), "a b - c -");
        assert_eq!(postfix_text("a/b*c"), "a b / c *");
    }

    #[test]
    fn power_is_right_associative() {
        assert_eq!(postfix_text("a**b**c"), "a b c ** **");
    }

    #[test]
    fn parentheses_group() {
        assert_eq!(postfix_text("(1+2)*3"), "# # + # *");
        assert_eq!(postfix_text("((a))"), "a");
    }

    #[test]
    fn unary_prefix_binds_tightest() {
        assert_eq!(postfix_text("sin pi + 1"), "pi sin # +");
        assert_eq!(postfix_text("sin (a+b)"), "a b + sin");
        assert_eq!(postfix_text("_ a * b"), "a _ b *");
        assert_eq!(postfix_text("! ~ a"), "a ~ !");
    }

    #[test]
    fn prefix_minus_becomes_invert() {
        assert_eq!(postfix_text("-a"), "a _");
        assert_eq!(postfix_text("b*-a"), "b a _ *");
        assert_eq!(postfix_text("(-a)"), "a _");
        assert_eq!(postfix_text("a - b"), "a b -");
        assert_eq!(postfix_text("(a) - b"), "a b -");
    }

    #[test]
    fn mismatched_parentheses() {
        assert_eq!(convert("1+2) * 3"), Err(SyntaxError::MismatchedParen));
        assert_eq!(convert("(1+2"), Err(SyntaxError::MismatchedParen));
        assert_eq!(convert(")"), Err(SyntaxError::MismatchedParen));
    }

    #[test]
    fn invalid_token_fails() {
        assert_eq!(
            infix_to_postfix(&[Token::Number, Token::Invalid]),
            Err(SyntaxError::StructuralToken { position: 1 })
        );
    }

    #[test]
    fn output_revalidates_to_the_same_depth() {
        for text in ["2+3*4", "(a+b)*(c-d)", "t*(t>>5|t>>8)", "sin (twoPi * nf * rs)"] {
            let postfix = convert(text).unwrap();
            let first = validate(&postfix).unwrap();
            let second = validate(&postfix).unwrap();
            assert_eq!(first, second, "{}", text);
            assert!(!postfix.contains(&Token::LeftParen));
        }
    }

    #[test]
    fn converting_postfix_shaped_input_is_harmless() {
        assert_eq!(convert("1").unwrap(), vec![Token::Number]);
    }
}
