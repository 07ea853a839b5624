// src/strategy/input.rs

use crate::error::PolicyError;
use crate::model::agent::AgentState;
use crate::strategy::traits::OrderInput;
use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};

/// Prompts on `writer` and reads one integer per line from `reader`.
pub struct LineInput<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead + Send, W: Write + Send> LineInput<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl LineInput<BufReader<Stdin>, Stdout> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead + Send, W: Write + Send> OrderInput for LineInput<R, W> {
    fn read_order(&mut self, state: &AgentState) -> Result<i64, PolicyError> {
        let shown = serde_json::to_string(state).unwrap_or_else(|_| format!("{state:?}"));
        writeln!(self.writer, "Agent state: {shown}")?;
        write!(self.writer, "Enter order (non-negative integers only): ")?;
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(PolicyError::InputClosed);
        }
        let trimmed = line.trim();
        let order: i64 = trimmed
            .parse()
            .map_err(|_| PolicyError::InvalidInput(trimmed.to_string()))?;
        if order < 0 {
            return Err(PolicyError::NegativeOrder(order));
        }
        Ok(order)
    }
}
