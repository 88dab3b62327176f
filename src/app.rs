//! Command runner that drives a loader and reports every step as JSON

use std::io::Write;

use color_eyre::eyre::Result;
use serde::Serialize;
use tracing::info;

use crate::{
    core::{Pagination, PaginationState},
    infrastructure::{
        cli::Command,
        loader::{LoadError, LoadedPage, TimelineLoader},
        source::MessageSource,
    },
};

#[derive(Serialize)]
struct Step<'a> {
    step: usize,
    request: Option<&'a Pagination>,
    received: usize,
    inserted: usize,
    window_len: usize,
    state: &'a PaginationState,
}

pub struct App<S, W> {
    loader: TimelineLoader<S>,
    out: W,
    compact: bool,
    steps: usize,
}

impl<S: MessageSource, W: Write> App<S, W> {
    pub fn new(loader: TimelineLoader<S>, out: W, compact: bool) -> Self {
        Self {
            loader,
            out,
            compact,
            steps: 0,
        }
    }

    pub fn loader(&self) -> &TimelineLoader<S> {
        &self.loader
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub async fn run(&mut self, command: &Command) -> Result<()> {
        match command {
            Command::Walk => self.walk().await,
            Command::Jump { anchor } => self.jump(anchor).await,
            Command::State => self.report(None),
        }
    }

    async fn walk(&mut self) -> Result<()> {
        let page = self.loader.load_initial().await?;
        self.report(Some(&page))?;

        while !self.loader.state().has_loaded_all_older() {
            let page = self.loader.load_older().await?;
            self.report(Some(&page))?;
        }
        info!(
            steps = self.steps,
            loaded = self.loader.window_len(),
            "reached the oldest message"
        );
        Ok(())
    }

    async fn jump(&mut self, anchor: &str) -> Result<()> {
        let page = self.loader.jump_to(anchor).await?;
        self.report(Some(&page))?;

        while self.loader.state().is_jumping_to_anchor() {
            match self.loader.load_newer().await {
                Ok(page) => self.report(Some(&page))?,
                Err(LoadError::ReachedNewest) => break,
                Err(e) => return Err(e.into()),
            }
        }
        info!(
            steps = self.steps,
            loaded = self.loader.window_len(),
            %anchor,
            "jump resolved"
        );
        Ok(())
    }

    fn report(&mut self, page: Option<&LoadedPage>) -> Result<()> {
        self.steps += 1;
        let state = self.loader.state();
        let step = Step {
            step: self.steps,
            request: page.map(|p| &p.pagination),
            received: page.map_or(0, |p| p.messages.len()),
            inserted: page.map_or(0, |p| p.inserted),
            window_len: self.loader.window_len(),
            state: &state,
        };

        if self.compact {
            serde_json::to_writer(&mut self.out, &step)?;
        } else {
            serde_json::to_writer_pretty(&mut self.out, &step)?;
        }
        writeln!(self.out)?;
        Ok(())
    }
}
