//! This module turns a loosely-typed [`ProgramDescriptor`] into a validated [`Program`].
//!
//! Every entry of the transition table is checked before anything is built, so a
//! malformed descriptor is rejected as a whole and never yields a partial table.

use crate::types::{
    Direction, Explanation, Program, ProgramDescriptor, StateInfo, Transition, TuringMachineError,
};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Represents the problems that can be found while analyzing a program descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// A transition key is not of the form `"state,symbol"`.
    #[error("transition key '{0}' is not of the form \"state,symbol\"")]
    InvalidTransitionKey(String),
    /// A transition value does not hold exactly `[next_state, write_symbol, direction]`.
    #[error("transition '{key}' must have 3 elements [next_state, write, direction], found {found}")]
    InvalidTransitionArity { key: String, found: usize },
    /// A transition value names an empty next state.
    #[error("transition '{0}' has an empty next state")]
    EmptyNextState(String),
    /// A direction code other than `L`, `R` or `N`.
    #[error("unknown direction '{0}', expected one of L, R, N")]
    UnknownDirection(String),
    /// A symbol that is not exactly one character long.
    #[error("symbol '{0}' must be exactly one character")]
    InvalidSymbol(String),
    /// Two keys normalize to the same `(state, symbol)` pair.
    #[error("duplicate transition for state '{0}' and symbol '{1}'")]
    DuplicateTransition(String, char),
    /// An explanation key is not of the form `"state,symbol"`.
    #[error("explanation key '{0}' is not of the form \"state,symbol\"")]
    InvalidExplanationKey(String),
    /// Two explanation keys normalize to the same `(state, symbol)` pair.
    #[error("duplicate explanation for state '{0}' and symbol '{1}'")]
    DuplicateExplanation(String, char),
    /// The initial state is empty.
    #[error("initial state must not be empty")]
    EmptyInitialState,
}

/// Analyzes a descriptor and builds the transition table.
///
/// # Returns
///
/// * `Ok(Program)` if every entry is well-formed.
/// * `Err(TuringMachineError::ValidationError)` describing the first problem found.
pub fn analyze(descriptor: &ProgramDescriptor) -> Result<Program, TuringMachineError> {
    let initial_state = descriptor.initial_state.trim();
    if initial_state.is_empty() {
        return Err(AnalysisError::EmptyInitialState.into());
    }

    let blank = parse_symbol(&descriptor.blank_symbol)?;
    let mut rules: HashMap<String, HashMap<char, Transition>> = HashMap::new();

    for (key, value) in &descriptor.transitions {
        let (state, symbol) = parse_key(key)?;
        let transition = parse_value(key, value)?;

        let by_symbol = rules.entry(state.to_string()).or_default();
        if by_symbol.insert(symbol, transition).is_some() {
            return Err(AnalysisError::DuplicateTransition(state.to_string(), symbol).into());
        }
    }

    let explanations = collect_explanations(descriptor)?;
    let state_info: HashMap<String, StateInfo> = descriptor
        .states
        .iter()
        .map(|(state, info)| (state.trim().to_string(), info.clone()))
        .collect();

    Ok(Program {
        name: descriptor.name.clone().unwrap_or_default(),
        initial_state: initial_state.to_string(),
        accept_states: collect_states(&descriptor.accept_states),
        reject_states: collect_states(&descriptor.reject_states),
        blank,
        rules,
        goal: descriptor.goal.clone(),
        state_info,
        explanations,
    })
}

/// Groups rule explanations the same way as the transition table.
fn collect_explanations(
    descriptor: &ProgramDescriptor,
) -> Result<HashMap<String, HashMap<char, Explanation>>, AnalysisError> {
    let mut explanations: HashMap<String, HashMap<char, Explanation>> = HashMap::new();

    for (key, explanation) in &descriptor.explanations {
        let (state, symbol) =
            parse_key(key).map_err(|_| AnalysisError::InvalidExplanationKey(key.to_string()))?;

        let by_symbol = explanations.entry(state.to_string()).or_default();
        if by_symbol.insert(symbol, explanation.clone()).is_some() {
            return Err(AnalysisError::DuplicateExplanation(state.to_string(), symbol));
        }
    }

    Ok(explanations)
}

/// Splits a `"state,symbol"` key on its first comma and trims both halves.
///
/// The symbol half may itself be a comma, e.g. `"q0,,"`.
pub fn parse_key(key: &str) -> Result<(&str, char), AnalysisError> {
    let (state, symbol) = key
        .split_once(',')
        .ok_or_else(|| AnalysisError::InvalidTransitionKey(key.to_string()))?;

    let state = state.trim();
    if state.is_empty() {
        return Err(AnalysisError::InvalidTransitionKey(key.to_string()));
    }

    let symbol = parse_symbol(symbol)
        .map_err(|_| AnalysisError::InvalidTransitionKey(key.to_string()))?;

    Ok((state, symbol))
}

fn parse_value(key: &str, value: &[String]) -> Result<Transition, AnalysisError> {
    let [next_state, write, direction] = value else {
        return Err(AnalysisError::InvalidTransitionArity {
            key: key.to_string(),
            found: value.len(),
        });
    };

    let next_state = next_state.trim();
    if next_state.is_empty() {
        return Err(AnalysisError::EmptyNextState(key.to_string()));
    }

    Ok(Transition {
        next_state: next_state.to_string(),
        write: parse_symbol(write)?,
        direction: direction.parse::<Direction>()?,
    })
}

/// Parses a single-character symbol, ignoring surrounding whitespace.
fn parse_symbol(input: &str) -> Result<char, AnalysisError> {
    let mut chars = input.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(symbol), None) => Ok(symbol),
        _ => Err(AnalysisError::InvalidSymbol(input.to_string())),
    }
}

fn collect_states(states: &[String]) -> HashSet<String> {
    states.iter().map(|s| s.trim().to_string()).collect()
}
