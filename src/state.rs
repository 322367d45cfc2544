use chrono::Local;
use rand::seq::SliceRandom;

use crate::request::RequestLifecycle;

/// Full application state, minus the theme which `PreferenceStore` owns.
pub struct AppState {
    pub request: RequestLifecycle,
    pub input: String,
    pub cursor_pos: usize,
    pub loading_phrases: Vec<String>,
    pub loading_phrase_idx: usize,
    pub spinner_tick: usize,
    pub should_quit: bool,
    pub input_history: Vec<String>,
    pub history_idx: Option<usize>,
    pub history_draft: String,
    pub last_generated_at: Option<String>,
}

const PHRASE_POOL: &[&str] = &[
    "generating",
    "drawing boxes",
    "connecting arrows",
    "laying out nodes",
    "sketching",
    "picking a direction",
    "labelling edges",
    "reading your description",
    "finding the flow",
    "untangling lines",
    "placing subgraphs",
    "one sec",
    "hang tight",
];

const MAX_HISTORY: usize = 50;

impl AppState {
    pub fn new() -> Self {
        let mut phrases: Vec<String> = PHRASE_POOL.iter().map(|s| s.to_string()).collect();
        let mut rng = rand::thread_rng();
        phrases.shuffle(&mut rng);

        Self {
            request: RequestLifecycle::new(),
            input: String::new(),
            cursor_pos: 0,
            loading_phrases: phrases,
            loading_phrase_idx: 0,
            spinner_tick: 0,
            should_quit: false,
            input_history: Vec::new(),
            history_idx: None,
            history_draft: String::new(),
            last_generated_at: None,
        }
    }

    pub fn loading_phrase(&self) -> &str {
        &self.loading_phrases[self.loading_phrase_idx % self.loading_phrases.len()]
    }

    pub fn next_loading_phrase(&mut self) {
        self.loading_phrase_idx = (self.loading_phrase_idx + 1) % self.loading_phrases.len();
    }

    pub fn mark_generated(&mut self) {
        self.last_generated_at = Some(Local::now().format("%H:%M").to_string());
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
        self.cursor_pos = 0;
    }

    pub fn push_history(&mut self, input: String) {
        if !input.trim().is_empty() {
            // Avoid consecutive duplicates
            if self.input_history.last() != Some(&input) {
                self.input_history.push(input);
                if self.input_history.len() > MAX_HISTORY {
                    self.input_history.remove(0);
                }
            }
        }
        self.history_idx = None;
        self.history_draft.clear();
    }

    pub fn history_up(&mut self) {
        if self.input_history.is_empty() {
            return;
        }
        match self.history_idx {
            None => {
                self.history_draft = self.input.clone();
                self.history_idx = Some(self.input_history.len() - 1);
            }
            Some(0) => return,
            Some(idx) => {
                self.history_idx = Some(idx - 1);
            }
        }
        if let Some(idx) = self.history_idx {
            self.input = self.input_history[idx].clone();
            self.cursor_pos = self.input.chars().count();
        }
    }

    pub fn history_down(&mut self) {
        let Some(idx) = self.history_idx else {
            return;
        };
        if idx + 1 >= self.input_history.len() {
            self.history_idx = None;
            self.input = self.history_draft.clone();
        } else {
            self.history_idx = Some(idx + 1);
            self.input = self.input_history[idx + 1].clone();
        }
        self.cursor_pos = self.input.chars().count();
    }
}
