//! Conversational participants in the deduction game.
//!
//! Each agent owns its suspicion table, a bounded memory of the
//! conversation, and the scripted lines it falls back on when no language
//! responder is bound. All decision logic lives here; the game loop only
//! sequences the calls and moves names and text between agents.

use crate::game::GameError;
use crate::responder::{Responder, ResponderError};
use crate::rng::GameRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

/// Maximum number of transcript entries an agent keeps in memory.
const MAX_MEMORY_ENTRIES: usize = 24;

/// How many recent memory entries go into generation prompts.
const HISTORY_WINDOW: usize = 10;

/// Terms that make an answer sound suspicious to a listener.
const SUSPICIOUS_TERMS: [&str; 8] = [
    "hesitate",
    "blood",
    "alibi",
    "excuse",
    "nervous",
    "cleaned",
    "alone",
    "inventory",
];

/// Scripted whispers, with `{target}` standing in for the framed agent.
const WHISPER_TEMPLATES: [&str; 4] = [
    "Don't react—{target} keeps twisting their story.",
    "If we corner {target}, the whole façade crumbles.",
    "Let's set {target} up; their nerves are already fraying.",
    "Did you catch how {target} dodged that detail? It's our leverage.",
];

/// An agent's hidden alignment, assigned once at game start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Innocent,
    Murderer,
}

/// A private message passed between two agents.
#[derive(Debug, Clone)]
pub struct Whisper {
    /// The whispered text.
    pub message: String,
    /// Name of the agent being framed.
    pub framed: String,
}

/// One character in the game.
pub struct Agent {
    /// Display name, unique within the roster.
    pub name: String,
    /// Short persona used in generation prompts.
    pub persona: String,
    role: Role,
    suspicion: BTreeMap<String, u32>,
    memory: Vec<String>,
    inquisitive_lines: Vec<String>,
    defensive_lines: Vec<String>,
    guilty_lines: Vec<String>,
    responder: Option<Arc<dyn Responder>>,
    last_whisper_round: u32,
}

impl Agent {
    /// Create an innocent agent with the given scripted lines.
    pub fn new(
        name: impl Into<String>,
        persona: impl Into<String>,
        inquisitive_lines: &[&str],
        defensive_lines: &[&str],
        guilty_lines: &[&str],
    ) -> Self {
        Self {
            name: name.into(),
            persona: persona.into(),
            role: Role::Innocent,
            suspicion: BTreeMap::new(),
            memory: Vec::new(),
            inquisitive_lines: inquisitive_lines.iter().map(|s| s.to_string()).collect(),
            defensive_lines: defensive_lines.iter().map(|s| s.to_string()).collect(),
            guilty_lines: guilty_lines.iter().map(|s| s.to_string()).collect(),
            responder: None,
            last_whisper_round: 0,
        }
    }

    /// Bind a language responder. Ignored when the responder reports
    /// itself unavailable; the agent then stays fully scripted.
    pub fn with_responder(mut self, responder: Arc<dyn Responder>) -> Self {
        if responder.available() {
            self.responder = Some(responder);
        }
        self
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_murderer(&self) -> bool {
        self.role == Role::Murderer
    }

    pub(crate) fn assign_role(&mut self, role: Role) {
        self.role = role;
    }

    /// Current suspicion toward the named agent (0 when unseen).
    pub fn suspicion_toward(&self, name: &str) -> u32 {
        self.suspicion.get(name).copied().unwrap_or(0)
    }

    /// Number of transcript entries currently held in memory.
    pub fn memory_count(&self) -> usize {
        self.memory.len()
    }

    // ======================================================================
    // Memory
    // ======================================================================

    /// Record a transcript entry for later prompting.
    pub fn observe(&mut self, entry: &str) {
        self.memory.push(entry.to_string());
        while self.memory.len() > MAX_MEMORY_ENTRIES {
            self.memory.remove(0);
        }
    }

    fn history_snippet(&self) -> String {
        if self.memory.is_empty() {
            return "No meaningful conversation yet.".to_string();
        }
        let start = self.memory.len().saturating_sub(HISTORY_WINDOW);
        self.memory[start..].join("\n")
    }

    fn system_prompt(&self) -> String {
        let alignment = match self.role {
            Role::Murderer => {
                "You are secretly the murderer. Conceal your identity while bending suspicion toward others."
            }
            Role::Innocent => "You are innocent and determined to expose the true culprit.",
        };
        format!(
            "You are {}, {} in a dramatic deduction game. {} Speak vividly but concisely.",
            self.name, self.persona, alignment
        )
    }

    /// Context snippet delivered at the start of each round.
    pub fn context_line(&self, round: u32) -> String {
        match self.role {
            Role::Murderer => format!(
                "You are secretly the murderer. Remember to stay composed while sowing doubt. \
                 Round {round} is about to begin."
            ),
            Role::Innocent => format!(
                "You are innocent and must work with the others to expose the killer. \
                 Round {round} is about to begin."
            ),
        }
    }

    // ======================================================================
    // Interrogation
    // ======================================================================

    /// Pick someone to question, leaning toward those this agent distrusts.
    ///
    /// Returns the roster index of the chosen target. Every other agent
    /// carries weight `max(1, suspicion)`, so nobody is ever fully safe
    /// from questioning.
    pub fn choose_target(&self, roster: &[Agent], rng: &mut GameRng) -> Result<usize, GameError> {
        let candidates: Vec<usize> = roster
            .iter()
            .enumerate()
            .filter(|(_, agent)| agent.name != self.name)
            .map(|(index, _)| index)
            .collect();

        if candidates.is_empty() {
            return Err(GameError::RosterTooSmall {
                found: roster.len(),
            });
        }

        let weights: Vec<u32> = candidates
            .iter()
            .map(|&index| self.suspicion_toward(&roster[index].name).max(1))
            .collect();

        Ok(candidates[rng.weighted_index(&weights)])
    }

    /// Generate a question directed at the chosen target.
    pub async fn craft_question(&self, target_name: &str, rng: &mut GameRng, round: u32) -> String {
        if self.responder.is_some() {
            match self.generated_question(target_name, round).await {
                Ok(question) => return question,
                Err(error) => {
                    warn!(agent = %self.name, %error, "question generation failed, using scripted line");
                }
            }
        }
        self.scripted_question(target_name, rng, round)
    }

    fn scripted_question(&self, target_name: &str, rng: &mut GameRng, round: u32) -> String {
        let line = rng.pick(&self.inquisitive_lines);
        let suspicion = self.suspicion_toward(target_name);

        let qualifier = if suspicion >= 3 {
            " Enough dodging—answer straight."
        } else if round > 2 && suspicion >= 2 {
            " I'm starting to piece things together."
        } else {
            ""
        };

        let mut question = format!("{line} {target_name},{qualifier}").trim().to_string();
        if !question.ends_with('?') {
            question.push('?');
        }
        question
    }

    async fn generated_question(
        &self,
        target_name: &str,
        round: u32,
    ) -> Result<String, ResponderError> {
        let responder = self.responder.as_ref().ok_or(ResponderError::Unavailable)?;
        let suspicion = self.suspicion_toward(target_name);
        let prompt = format!(
            "Round {round}. You must interrogate {target_name}. \
             Your suspicion score for them is {suspicion} on a scale where 4 means certain guilt.\n\
             Recent transcript:\n{}\n\n\
             Compose a single probing question (<= 25 words) to expose contradictions. \
             Invoke sensory detail or emotional pressure. Do not prefix with your name. \
             End with a question mark.",
            self.history_snippet()
        );

        let question = responder.generate(&self.system_prompt(), &prompt).await?;
        let question = question.trim();
        if question.ends_with('?') {
            Ok(question.to_string())
        } else {
            Ok(format!("{}?", question.trim_end_matches(['.', '!'])))
        }
    }

    // ======================================================================
    // Replies
    // ======================================================================

    /// Formulate a reply after being questioned.
    ///
    /// The reply is recorded in this agent's own memory before it is
    /// returned.
    pub async fn answer_question(&mut self, rng: &mut GameRng) -> String {
        if self.responder.is_some() {
            match self.generated_answer().await {
                Ok(reply) => {
                    self.observe(&reply);
                    return reply;
                }
                Err(error) => {
                    warn!(agent = %self.name, %error, "answer generation failed, using scripted line");
                }
            }
        }

        let source = match self.role {
            Role::Murderer => &self.guilty_lines,
            Role::Innocent => &self.defensive_lines,
        };
        let reply = rng.pick(source).clone();
        self.observe(&reply);
        reply
    }

    async fn generated_answer(&self) -> Result<String, ResponderError> {
        let responder = self.responder.as_ref().ok_or(ResponderError::Unavailable)?;
        let stance = match self.role {
            Role::Murderer => "You are the murderer. Deflect suspicion gracefully without confessing.",
            Role::Innocent => {
                "You are innocent. Provide a vivid, believable answer reinforcing your alibi."
            }
        };
        let prompt = format!(
            "The latest question is directed at you. {stance}\n\
             Recent transcript:\n{}\n\n\
             Respond in a single dramatic sentence (<= 28 words). Do not mention being an AI.",
            self.history_snippet()
        );

        let reply = responder.generate(&self.system_prompt(), &prompt).await?;
        Ok(reply.trim().to_string())
    }

    // ======================================================================
    // Suspicion
    // ======================================================================

    /// Adjust suspicion after hearing someone respond.
    ///
    /// Any suspicious term bumps the score by one; an innocuous answer
    /// lets a score above 1 decay by one. A score of 1 sticks.
    pub fn register_answer(&mut self, target_name: &str, answer: &str) {
        let score = self.suspicion_toward(target_name);
        let lowered = answer.to_lowercase();

        let updated = if SUSPICIOUS_TERMS.iter().any(|term| lowered.contains(term)) {
            score + 1
        } else if score > 1 {
            score - 1
        } else {
            score
        };

        self.suspicion.insert(target_name.to_string(), updated);
    }

    /// The most suspected agent and its score, ties going to the first
    /// name in table order. `None` while the table is empty.
    pub fn top_suspect(&self) -> Option<(&str, u32)> {
        let mut best: Option<(&str, u32)> = None;
        for (name, &score) in &self.suspicion {
            let better = match best {
                None => true,
                Some((_, best_score)) => score > best_score,
            };
            if better {
                best = Some((name.as_str(), score));
            }
        }
        best
    }

    // ======================================================================
    // Accusations
    // ======================================================================

    /// Decide whether to accuse someone this turn.
    ///
    /// The threshold branch runs first; the murderer's distraction
    /// accusation is only considered when the threshold branch produced
    /// nothing, and at most one suspect is returned per call.
    pub fn maybe_accuse(&self, round: u32) -> Option<String> {
        if let Some((suspect, score)) = self.top_suspect() {
            let threshold = match self.role {
                Role::Innocent => 3,
                Role::Murderer => 4,
            };
            if score >= threshold {
                return Some(suspect.to_string());
            }
            if round >= 3 && score >= threshold - 1 {
                return Some(suspect.to_string());
            }
            if round >= 4 && self.role == Role::Innocent && score >= 1 {
                return Some(suspect.to_string());
            }
        }

        // The murderer occasionally fires a distraction accusation.
        if self.role == Role::Murderer
            && round >= 2
            && self.suspicion.values().any(|&score| score >= 2)
        {
            return self.top_suspect().map(|(name, _)| name.to_string());
        }

        None
    }

    /// Produce the spoken accusation against the chosen suspect.
    pub async fn accusation_line(&self, suspect: &str, round: u32) -> String {
        if self.responder.is_some() {
            match self.generated_accusation(suspect, round).await {
                Ok(line) => return line,
                Err(error) => {
                    warn!(agent = %self.name, %error, "accusation generation failed, using template");
                }
            }
        }
        format!("I accuse {suspect} of the murder!")
    }

    async fn generated_accusation(
        &self,
        suspect: &str,
        round: u32,
    ) -> Result<String, ResponderError> {
        let responder = self.responder.as_ref().ok_or(ResponderError::Unavailable)?;
        let prompt = format!(
            "Round {round}. You are about to accuse {suspect}.\n\
             Recent transcript:\n{}\n\n\
             Deliver one bold sentence (<= 22 words) that contains the exact phrase 'I accuse' \
             followed by the suspect's name. Do not confess even if you are guilty.",
            self.history_snippet()
        );

        let line = responder.generate(&self.system_prompt(), &prompt).await?;
        let cleaned = line.trim();
        if cleaned.contains("I accuse") {
            Ok(cleaned.to_string())
        } else {
            Ok(format!("I accuse {suspect} of the murder!"))
        }
    }

    // ======================================================================
    // Whispers
    // ======================================================================

    /// Attempt a private whisper to `partner`, framing a third agent.
    ///
    /// At most one whisper per agent per round. `roster_names` is the full
    /// roster; this agent and the partner are excluded from frame-target
    /// selection. Returns `None` when nothing is whispered.
    pub async fn whisper(
        &mut self,
        partner: &str,
        roster_names: &[String],
        round: u32,
        rng: &mut GameRng,
    ) -> Option<Whisper> {
        if self.last_whisper_round == round {
            return None;
        }

        let target_name = self.select_frame_target(roster_names, partner, rng)?;

        let mut message = if self.responder.is_some() {
            match self.generated_whisper(partner, &target_name, round).await {
                Ok(message) => message,
                Err(error) => {
                    warn!(agent = %self.name, %error, "whisper generation failed, using template");
                    self.templated_whisper(&target_name, rng)
                }
            }
        } else {
            self.templated_whisper(&target_name, rng)
        };

        if message.is_empty() {
            return None;
        }

        if !message.contains(&target_name) {
            message = format!("{message} {target_name}.");
        }

        self.last_whisper_round = round;
        Some(Whisper {
            message,
            framed: target_name,
        })
    }

    /// Highest-suspicion candidate when any score is positive, otherwise a
    /// uniform pick. Ties go to the earliest candidate.
    fn select_frame_target(
        &self,
        roster_names: &[String],
        partner: &str,
        rng: &mut GameRng,
    ) -> Option<String> {
        let candidates: Vec<&str> = roster_names
            .iter()
            .map(String::as_str)
            .filter(|name| *name != self.name && *name != partner)
            .collect();

        if candidates.is_empty() {
            return None;
        }

        let mut best: Option<(&str, u32)> = None;
        for &name in &candidates {
            let score = self.suspicion_toward(name);
            let better = match best {
                None => true,
                Some((_, best_score)) => score > best_score,
            };
            if better {
                best = Some((name, score));
            }
        }

        if let Some((name, score)) = best {
            if score > 0 {
                return Some(name.to_string());
            }
        }

        Some(rng.pick(&candidates).to_string())
    }

    fn templated_whisper(&self, target_name: &str, rng: &mut GameRng) -> String {
        rng.pick(&WHISPER_TEMPLATES).replace("{target}", target_name)
    }

    async fn generated_whisper(
        &self,
        partner: &str,
        target_name: &str,
        round: u32,
    ) -> Result<String, ResponderError> {
        let responder = self.responder.as_ref().ok_or(ResponderError::Unavailable)?;
        let stance = match self.role {
            Role::Murderer => "You are the murderer. Guide the whisper to frame someone else subtly.",
            Role::Innocent => {
                "You are innocent. Conspire with your ally to expose the likely culprit."
            }
        };
        let prompt = format!(
            "Round {round}. You lean toward {partner} and whisper. {stance}\n\
             You want to set up {target_name} without drawing attention.\n\
             Recent transcript:\n{}\n\n\
             Craft a secretive whisper (<= 20 words) that explicitly names {target_name} \
             and hints at a coordinated move. Keep it tense and dramatic.",
            self.history_snippet()
        );

        let message = responder.generate(&self.system_prompt(), &prompt).await?;
        Ok(message.trim().to_string())
    }
}
