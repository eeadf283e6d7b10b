//! The requirement-term algebra.
//!
//! A [`Term`] is an algebraic expression over named leaves: sum (`+`) means
//! alternative, product (`*`) means "requires", [`Term::Identity`] is the
//! product-neutral element and [`Term::Terminal`] terminates a side of a
//! product. Terms are plain expression trees; evaluation is a pure fold
//! that computes the edge set implied by fully distributing products over
//! sums and collapsing the neutral elements:
//!
//! - `sum` unions sources, sinks, and edges (associative, commutative);
//! - `product(a, b)` adds one edge per `(sink of a, source of b)` pair;
//! - `Identity` passes sources and sinks through unchanged (`I * t = t`);
//! - `Terminal` exposes no sources or sinks, so `t * O` keeps `t`'s edges
//!   but stops anything downstream from connecting to `t`'s sinks.
//!
//! Two terms are *equivalent* when they denote the same edge set after
//! this normalization; structural equality (`==`) is separate and exact.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::{Add, Mul};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// An algebraic requirement expression. Leaves carry the fully qualified
/// class name of the node they reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Term {
    /// The product-neutral element `I`.
    Identity,
    /// The terminating element `O`.
    Terminal,
    /// A named leaf referencing a registered class name.
    Leaf(String),
    /// Alternative: `a + b`.
    Sum(Box<Term>, Box<Term>),
    /// Composition/requirement: `a * b`.
    Product(Box<Term>, Box<Term>),
}

/// The result of folding a term: the flow summary the graph consumes.
#[derive(Debug, Clone, Default)]
pub(crate) struct Flow {
    /// Leaves that downstream factors would connect *to*.
    pub sources: BTreeSet<String>,
    /// Leaves that connect to upstream factors' sources.
    pub sinks: BTreeSet<String>,
    /// Direct requirement edges, each exactly once.
    pub edges: BTreeSet<(String, String)>,
    /// Every leaf mentioned anywhere in the term.
    pub leaves: BTreeSet<String>,
    /// Whether the term contains an identity path, i.e. behaves as a
    /// passthrough inside a product (`a * (I + x) = a + a * x`).
    pub passthrough: bool,
}

impl Term {
    pub(crate) fn flow(&self) -> Flow {
        match self {
            Term::Identity => Flow {
                passthrough: true,
                ..Flow::default()
            },
            Term::Terminal => Flow::default(),
            Term::Leaf(name) => {
                let mut flow = Flow::default();
                flow.sources.insert(name.clone());
                flow.sinks.insert(name.clone());
                flow.leaves.insert(name.clone());
                flow
            }
            Term::Sum(a, b) => {
                let mut flow = a.flow();
                let other = b.flow();
                flow.sources.extend(other.sources);
                flow.sinks.extend(other.sinks);
                flow.edges.extend(other.edges);
                flow.leaves.extend(other.leaves);
                flow.passthrough |= other.passthrough;
                flow
            }
            Term::Product(a, b) => {
                let left = a.flow();
                let right = b.flow();
                let mut flow = Flow {
                    passthrough: left.passthrough && right.passthrough,
                    ..Flow::default()
                };
                for sink in &left.sinks {
                    for source in &right.sources {
                        flow.edges.insert((sink.clone(), source.clone()));
                    }
                }
                flow.edges.extend(left.edges);
                flow.edges.extend(right.edges);

                flow.sources.extend(left.sources);
                if left.passthrough {
                    flow.sources.extend(right.sources.iter().cloned());
                }
                flow.sinks.extend(right.sinks);
                if right.passthrough {
                    flow.sinks.extend(left.sinks);
                }
                flow.leaves.extend(left.leaves);
                flow.leaves.extend(right.leaves);
                flow
            }
        }
    }

    /// The direct requirement edges this term denotes, in sorted order.
    pub fn edges(&self) -> Vec<(String, String)> {
        self.flow().edges.into_iter().collect()
    }

    /// Every leaf class name mentioned in the term, in sorted order.
    pub fn leaves(&self) -> Vec<String> {
        self.flow().leaves.into_iter().collect()
    }

    /// Denotational equality: both terms yield the same edge set once
    /// wrapped between terminal elements and normalized.
    pub fn equivalent(&self, other: &Term) -> bool {
        let wrap = |t: &Term| (Term::Terminal * t.clone() * Term::Terminal).flow().edges;
        wrap(self) == wrap(other)
    }

    /// The ordered factors of the term's product spine; a non-product term
    /// is its own single factor.
    fn factors(&self) -> SmallVec<[&Term; 4]> {
        fn walk<'a>(term: &'a Term, out: &mut SmallVec<[&'a Term; 4]>) {
            match term {
                Term::Product(left, right) => {
                    walk(left, out);
                    walk(right, out);
                }
                other => out.push(other),
            }
        }
        let mut out = SmallVec::new();
        walk(self, &mut out);
        out
    }

    /// Yields the term's proper tail-products: for `a * b * c`, the
    /// sub-expressions `b * c` and `c`. Factors that are a lone neutral
    /// element are skipped, as is any tail whose recombination with the
    /// terminal element is equivalent to the whole term (those are just
    /// terminated spellings of the input, not reusable intermediates).
    pub fn intermediate_terms(&self) -> Vec<Term> {
        let factors = self.factors();
        if factors.len() < 2 {
            return Vec::new();
        }
        let mut out = Vec::new();
        for start in 1..factors.len() {
            let mut iter = factors[start..].iter().map(|t| (*t).clone());
            let first = match iter.next() {
                Some(first) => first,
                None => continue,
            };
            let tail = iter.fold(first, |acc, factor| acc * factor);
            if matches!(tail, Term::Identity | Term::Terminal) {
                continue;
            }
            if (tail.clone() * Term::Terminal).equivalent(self) {
                continue;
            }
            out.push(tail);
        }
        out
    }
}

impl Add for Term {
    type Output = Term;

    fn add(self, rhs: Term) -> Term {
        Term::Sum(Box::new(self), Box::new(rhs))
    }
}

impl Mul for Term {
    type Output = Term;

    fn mul(self, rhs: Term) -> Term {
        Term::Product(Box::new(self), Box::new(rhs))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Identity => write!(f, "I"),
            Term::Terminal => write!(f, "O"),
            Term::Leaf(name) => write!(f, "{name}"),
            Term::Sum(a, b) => write!(f, "({a} + {b})"),
            Term::Product(a, b) => write!(f, "({a} * {b})"),
        }
    }
}
