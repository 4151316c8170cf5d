/// Scene stack: the current frame of content and options, plus the
/// pending-page stack that populates future frames.
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::core::resolver::ScriptError;
use crate::core::state::GameState;
use crate::schema::content::{Content, Fragment, SceneOption};
use crate::schema::instruction::Instruction;

/// Name of the script every "continue" option runs.
pub const ADVANCE: &str = "advance";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    content: Vec<Content>,
    options: Vec<SceneOption>,
    pending: VecDeque<Instruction>,
    /// Bumped on every append; a page is visible iff it moved this.
    #[serde(skip)]
    revision: u64,
}

/// Scenes compare by what the player sees and what is queued.
impl PartialEq for Scene {
    fn eq(&self, other: &Self) -> bool {
        self.content == other.content
            && self.options == other.options
            && self.pending == other.pending
    }
}

impl Scene {
    pub fn content(&self) -> &[Content] {
        &self.content
    }

    pub fn options(&self) -> &[SceneOption] {
        &self.options
    }

    pub fn pending(&self) -> &VecDeque<Instruction> {
        &self.pending
    }

    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn add_content(&mut self, content: Content) {
        self.content.push(content);
        self.revision += 1;
    }

    pub fn add_paragraph(&mut self, fragments: Vec<Fragment>) {
        self.add_content(Content::Paragraph(fragments));
    }

    /// Append a paragraph of literal text, without interpolation.
    pub fn add_text(&mut self, text: &str) {
        self.add_paragraph(vec![Fragment::Literal(text.to_string())]);
    }

    pub fn add_speech(&mut self, speaker: &str, line: Vec<Fragment>) {
        self.add_content(Content::Speech {
            speaker: speaker.to_string(),
            line,
        });
    }

    pub fn add_option(&mut self, label: &str, instruction: Instruction) {
        self.options.push(SceneOption {
            label: label.to_string(),
            instruction,
        });
        self.revision += 1;
    }

    /// Empty the frame. The pending-page stack is untouched.
    pub fn clear(&mut self) {
        self.content.clear();
        self.options.clear();
    }

    /// Prepend pages so that `pages[0]` runs first.
    fn prepend(&mut self, pages: Vec<Instruction>) {
        for page in pages.into_iter().rev() {
            self.pending.push_front(page);
        }
    }
}

impl GameState {
    /// Interpolate a template and append it as a paragraph.
    pub fn narrate(&mut self, template: &str) {
        let fragments = self.interpolate(template);
        self.scene.add_paragraph(fragments);
    }

    /// Interpolate a template and append it as a speech line.
    pub fn speak(&mut self, speaker: &str, template: &str) {
        let line = self.interpolate(template);
        self.scene.add_speech(speaker, line);
    }

    /// Queue pages to run ahead of anything already pending, and give the
    /// player a way to reach them.
    ///
    /// The continue option counts as visible output, so a page that only
    /// pushes sub-pages stops a running `advance` on a frame holding just
    /// that option.
    pub fn push_pages(&mut self, pages: Vec<Instruction>) {
        self.scene.prepend(pages);
        self.offer_continue();
    }

    /// Run pending pages until one produces content or options.
    pub fn advance(&mut self, push: Option<Instruction>) -> Result<(), ScriptError> {
        self.advance_with(push.into_iter().collect())
    }

    /// As [`advance`](Self::advance), prepending several pages first.
    pub fn advance_with(&mut self, pages: Vec<Instruction>) -> Result<(), ScriptError> {
        self.scene.prepend(pages);
        self.drain_until_visible()?;
        self.offer_continue();
        Ok(())
    }

    fn drain_until_visible(&mut self) -> Result<(), ScriptError> {
        while let Some(page) = self.scene.pending.pop_front() {
            let before = self.scene.revision;
            self.run_instruction(&page)?;
            if self.scene.revision != before {
                debug!("page {} visible, {} pending", page.name, self.scene.pending.len());
                return Ok(());
            }
            debug!("page {} produced nothing, skipping", page.name);
        }
        Ok(())
    }

    /// Append the continue option when pages remain but the frame offers no
    /// choice.
    fn offer_continue(&mut self) {
        if !self.scene.has_options() && !self.scene.pending.is_empty() {
            let label = self.config().continue_label.clone();
            self.scene.add_option(&label, Instruction::bare(ADVANCE));
        }
    }
}
