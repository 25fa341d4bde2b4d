//! Boolean query evaluation over an [`InvertedIndex`].
//!
//! Queries are whitespace-separated infix expressions built from `&` (AND),
//! `|` (OR), parentheses and operands. An operand is a term, optionally
//! prefixed by `!` to take its complement against the universe. AND binds
//! tighter than OR. Evaluation is a two-stack shunting-yard pass: operand
//! sets on one stack, pending operators on the other.

use crate::error::{Error, QueryFault, Result};
use crate::index::{DocSet, InvertedIndex};
use crate::DocId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    And,
    Or,
    LParen,
}

impl Op {
    fn precedence(self) -> u8 {
        match self {
            Op::And => 2,
            Op::Or => 1,
            Op::LParen => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'q> {
    And,
    Or,
    LParen,
    RParen,
    Operand { term: &'q str, negated: bool },
}

fn lex(raw: &str) -> Result<Token<'_>, QueryFault> {
    Ok(match raw {
        "&" => Token::And,
        "|" => Token::Or,
        "(" => Token::LParen,
        ")" => Token::RParen,
        _ => {
            let term = raw.trim_start_matches('!');
            if term.is_empty() {
                return Err(QueryFault::EmptyNegation);
            }
            // each leading `!` flips the operand once
            let bangs = raw.len() - term.len();
            Token::Operand { term, negated: bangs % 2 == 1 }
        }
    })
}

/// Owns its index and the negation universe, both fixed at construction.
#[derive(Debug, Clone)]
pub struct BooleanEngine {
    index: InvertedIndex,
    universe: DocSet,
}

impl BooleanEngine {
    pub fn new(index: InvertedIndex) -> Self {
        let universe = index.universe();
        tracing::debug!(num_terms = index.num_terms(), universe = universe.len(), "boolean engine ready");
        Self { index, universe }
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    pub fn universe(&self) -> &DocSet {
        &self.universe
    }

    /// Evaluates `query` and returns the matching ids in ascending order.
    /// An empty query matches nothing. Unknown terms match nothing.
    pub fn search(&self, query: &str) -> Result<Vec<DocId>> {
        self.evaluate(query)
            .map(|docs| docs.into_iter().collect())
            .map_err(|fault| Error::Query { query: query.to_string(), fault })
    }

    fn evaluate(&self, query: &str) -> Result<DocSet, QueryFault> {
        let mut eval = Evaluator { operands: Vec::new(), ops: Vec::new() };
        // true while the grammar wants an operand or `(` next
        let mut expect_operand = true;
        let mut seen_any = false;

        for raw in query.split_whitespace() {
            seen_any = true;
            match lex(raw)? {
                Token::Operand { term, negated } => {
                    if !expect_operand {
                        return Err(QueryFault::MissingOperator);
                    }
                    eval.operands.push(self.resolve(term, negated));
                    expect_operand = false;
                }
                Token::And | Token::Or if expect_operand => return Err(QueryFault::MissingOperand),
                Token::And => {
                    eval.push_binary(Op::And)?;
                    expect_operand = true;
                }
                Token::Or => {
                    eval.push_binary(Op::Or)?;
                    expect_operand = true;
                }
                Token::LParen => {
                    if !expect_operand {
                        return Err(QueryFault::MissingOperator);
                    }
                    eval.ops.push(Op::LParen);
                }
                Token::RParen => {
                    if expect_operand {
                        return Err(QueryFault::MissingOperand);
                    }
                    eval.close_group()?;
                }
            }
        }

        if !seen_any {
            return Ok(DocSet::new());
        }
        if expect_operand {
            return Err(QueryFault::MissingOperand);
        }
        eval.finish()
    }

    fn resolve(&self, term: &str, negated: bool) -> DocSet {
        let docs = self.index.postings(term);
        match (docs, negated) {
            (Some(docs), false) => docs.clone(),
            (None, false) => DocSet::new(),
            (Some(docs), true) => &self.universe - docs,
            (None, true) => self.universe.clone(),
        }
    }
}

struct Evaluator {
    operands: Vec<DocSet>,
    ops: Vec<Op>,
}

impl Evaluator {
    fn push_binary(&mut self, incoming: Op) -> Result<(), QueryFault> {
        while let Some(&top) = self.ops.last() {
            if top == Op::LParen || top.precedence() < incoming.precedence() {
                break;
            }
            self.ops.pop();
            self.apply(top)?;
        }
        self.ops.push(incoming);
        Ok(())
    }

    fn close_group(&mut self) -> Result<(), QueryFault> {
        loop {
            match self.ops.pop() {
                Some(Op::LParen) => return Ok(()),
                Some(op) => self.apply(op)?,
                None => return Err(QueryFault::UnbalancedParens),
            }
        }
    }

    fn apply(&mut self, op: Op) -> Result<(), QueryFault> {
        // an open group left on the stack is a paren fault however many operands remain
        let union = match op {
            Op::And => false,
            Op::Or => true,
            Op::LParen => return Err(QueryFault::UnbalancedParens),
        };
        let b = self.operands.pop().ok_or(QueryFault::MissingOperand)?;
        let a = self.operands.pop().ok_or(QueryFault::MissingOperand)?;
        let combined = if union { &a | &b } else { &a & &b };
        self.operands.push(combined);
        Ok(())
    }

    fn finish(mut self) -> Result<DocSet, QueryFault> {
        while let Some(op) = self.ops.pop() {
            self.apply(op)?;
        }
        let result = self.operands.pop().ok_or(QueryFault::MissingOperand)?;
        if !self.operands.is_empty() {
            return Err(QueryFault::MissingOperator);
        }
        Ok(result)
    }
}
