//! This module provides the parser for `.tm` program texts, utilizing the `pest` crate.
//! It defines the grammar for `.tm` files and functions to parse the input into a
//! [`ProgramDescriptor`].

use crate::{
    analyzer::analyze,
    types::{
        Direction, Explanation, ProgramDescriptor, StateInfo, TuringMachineError,
        MAX_PROGRAM_SIZE,
    },
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::Pair,
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use std::collections::{BTreeMap, HashSet};

/// Derives a `PestParser` for the program grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct ProgramParser;

/// Parses the given input string into a `ProgramDescriptor`.
///
/// The descriptor is analyzed before being returned, so a successful parse is
/// guaranteed to load.
///
/// # Returns
///
/// * `Ok(ProgramDescriptor)` if the input is successfully parsed and validated.
/// * `Err(TuringMachineError::ParseError)` if there are any syntax errors.
/// * `Err(TuringMachineError::ValidationError)` if the program fails analysis.
pub fn parse(input: &str) -> Result<ProgramDescriptor, TuringMachineError> {
    if input.len() > MAX_PROGRAM_SIZE {
        return Err(TuringMachineError::ProgramTooLarge(input.len()));
    }

    let root = ProgramParser::parse(Rule::program, input.trim())
        .map_err(Box::new)?
        .next()
        .ok_or_else(|| TuringMachineError::DescriptorError("empty program".to_string()))?;

    let descriptor = parse_program(root)?;
    analyze(&descriptor)?;

    Ok(descriptor)
}

/// Parses the top-level sections of a program.
///
/// `rules` is mandatory. When `initial` is omitted, the source state of the first
/// rule is used.
fn parse_program(pair: Pair<Rule>) -> Result<ProgramDescriptor, TuringMachineError> {
    let program_span = pair.as_span();
    let mut descriptor = ProgramDescriptor::default();
    let mut initial_state: Option<String> = None;
    let mut rules: Option<(BTreeMap<String, Vec<String>>, Option<String>)> = None;
    let mut seen = HashSet::new();

    for p in pair.into_inner() {
        let rule = p.as_rule();
        if rule == Rule::EOI {
            continue;
        }

        check_unique_rule(rule, p.as_span(), &mut seen)?;

        match rule {
            Rule::name => descriptor.name = Some(parse_text(p)),
            Rule::description => descriptor.description = Some(parse_text(p)),
            Rule::goal => descriptor.goal = Some(parse_text(p)),
            Rule::input => descriptor.default_input = Some(parse_text(p)),
            Rule::blank => descriptor.blank_symbol = parse_text(p),
            Rule::initial => initial_state = Some(parse_text(p)),
            Rule::accept => descriptor.accept_states = parse_states(p),
            Rule::reject => descriptor.reject_states = parse_states(p),
            Rule::rules => rules = Some(parse_transitions(p)?),
            Rule::state_notes => descriptor.states = parse_state_notes(p)?,
            Rule::explanations => descriptor.explanations = parse_explanations(p)?,
            _ => {}
        }
    }

    let (transitions, first_state) =
        rules.ok_or_else(|| parse_error("Missing 'rules' section", program_span))?;

    descriptor.initial_state = initial_state
        .or(first_state)
        .ok_or_else(|| parse_error("Missing 'initial' section", program_span))?;
    descriptor.transitions = transitions;

    Ok(descriptor)
}

/// Parses the `rules` section into descriptor transitions keyed by `"state,symbol"`.
///
/// Also returns the source state of the first rule.
fn parse_transitions(
    pair: Pair<Rule>,
) -> Result<(BTreeMap<String, Vec<String>>, Option<String>), TuringMachineError> {
    let mut transitions = BTreeMap::new();
    let mut first_state = None;

    for transition_pair in pair.into_inner() {
        let span = transition_pair.as_span();
        let mut parts = transition_pair.into_inner();
        let mut next = || parts.next().map(|p| p.as_str().to_string()).unwrap_or_default();

        let (state, read, next_state, write, direction) = (next(), next(), next(), next(), next());

        if let Err(e) = direction.parse::<Direction>() {
            return Err(parse_error(&e.to_string(), span));
        }

        if first_state.is_none() {
            first_state = Some(state.clone());
        }

        // Prevent duplicated transition rule
        let key = format!("{},{}", state, read);
        if transitions.contains_key(&key) {
            return Err(parse_error(
                &format!("Duplicate transition rule: {state}, {read}"),
                span,
            ));
        }

        transitions.insert(key, vec![next_state, write, direction]);
    }

    Ok((transitions, first_state))
}

/// Parses the `states` section: `state: LABEL | description`.
fn parse_state_notes(
    pair: Pair<Rule>,
) -> Result<BTreeMap<String, StateInfo>, TuringMachineError> {
    let mut notes = BTreeMap::new();

    for note in pair.into_inner() {
        let span = note.as_span();
        let (key, headline, detail) = parse_note(note);
        let state = key.concat();

        if notes.contains_key(&state) {
            return Err(parse_error(&format!("Duplicate state notes: {state}"), span));
        }

        notes.insert(
            state,
            StateInfo {
                label: headline,
                description: detail,
            },
        );
    }

    Ok(notes)
}

/// Parses the `explain` section: `state, symbol: action | why`.
fn parse_explanations(
    pair: Pair<Rule>,
) -> Result<BTreeMap<String, Explanation>, TuringMachineError> {
    let mut explanations = BTreeMap::new();

    for entry in pair.into_inner() {
        let span = entry.as_span();
        let (key, action, why) = parse_note(entry);
        let key = key.join(",");

        if explanations.contains_key(&key) {
            return Err(parse_error(&format!("Duplicate explanation: {key}"), span));
        }

        explanations.insert(
            key,
            Explanation {
                action,
                why: why.unwrap_or_default(),
            },
        );
    }

    Ok(explanations)
}

/// Splits a note line into its key parts, its trimmed headline and optional detail.
fn parse_note(pair: Pair<Rule>) -> (Vec<String>, String, Option<String>) {
    let mut key = Vec::new();
    let mut headline = String::new();
    let mut detail = None;

    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::headline => headline = p.as_str().trim().to_string(),
            Rule::text => detail = Some(p.as_str().trim().to_string()),
            _ => key.push(p.as_str().to_string()),
        }
    }

    (key, headline, detail)
}

/// Parses a comma-separated list of states from an `accept` or `reject` section.
fn parse_states(pair: Pair<Rule>) -> Vec<String> {
    pair.into_inner()
        .flat_map(|states| states.into_inner())
        .map(|state| state.as_str().to_string())
        .collect()
}

/// Extracts the trimmed content of a single-valued section, empty if it has none.
fn parse_text(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .next()
        .map(|p| p.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Creates a `TuringMachineError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> TuringMachineError {
    TuringMachineError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

/// Checks if a given section has already been declared.
fn check_unique_rule(
    rule: Rule,
    span: Span,
    seen: &mut HashSet<Rule>,
) -> Result<(), TuringMachineError> {
    if !seen.insert(rule) {
        return Err(parse_error(
            &format!("Duplicate \"{rule:?}:\" declaration"),
            span,
        ));
    }

    Ok(())
}
