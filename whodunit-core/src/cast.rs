//! The default cast of four houseguests.
//!
//! Personas and scripted lines are static data; [`assemble`] turns them
//! into live [`Agent`]s at game start.

use crate::agent::Agent;
use crate::responder::Responder;
use std::sync::Arc;

/// Static description of one cast member.
pub struct CastMember {
    pub name: &'static str,
    pub persona: &'static str,
    pub inquisitive_lines: &'static [&'static str],
    pub defensive_lines: &'static [&'static str],
    pub guilty_lines: &'static [&'static str],
}

lazy_static::lazy_static! {
    /// The default scenario's cast. Several guilty and defensive lines are
    /// salted with terms the suspicion scanner reacts to, so whoever talks
    /// their way out of questions tends to draw attention over time.
    pub static ref CAST: Vec<CastMember> = vec![
        CastMember {
            name: "Ava",
            persona: "a methodical analyst with a dry wit",
            inquisitive_lines: &[
                "Walk me through your last hour",
                "Humor me and explain the noise I heard earlier",
                "Where exactly were you hiding out",
            ],
            defensive_lines: &[
                "I was cataloguing the supplies, nothing glamorous.",
                "Calm down—I kept to the kitchen inventory all night.",
                "Cross-check my logs, they have timestamps to spare.",
            ],
            guilty_lines: &[
                "Do we really have to do this again? I already explained that noise.",
                "Why are you grilling me when Bram was the last with the victim?",
                "You're chasing shadows; maybe focus on someone else for a change.",
            ],
        },
        CastMember {
            name: "Bram",
            persona: "a dramatic poet who fixates on symbolism",
            inquisitive_lines: &[
                "Tell us what scene unfolded in your mind tonight",
                "Spare us a verse about your evening whereabouts",
                "Who shared your company when the candles went dark",
            ],
            defensive_lines: &[
                "I brooded in the library, weaving metaphors about dust and time.",
                "Only the echoes kept me company—hardly murderous, I'd say.",
                "I mourned the silence alone; the quills can attest to that.",
            ],
            guilty_lines: &[
                "Accusing me? How gauche. Look at Cora's stained apron instead.",
                "My alibi is airtight, unlike Dax's shaky excuses.",
                "Why do you hesitate? Surely you'd have better prey than me.",
            ],
        },
        CastMember {
            name: "Cora",
            persona: "a restless chef desperate to feed everyone",
            inquisitive_lines: &[
                "Did you sample any midnight snacks without telling me",
                "How long were you away from the pantry",
                "Who did you see near the larder",
            ],
            defensive_lines: &[
                "I scrubbed the counters twice; you can check for yourself.",
                "The only thing on my hands is flour—nothing sinister.",
                "I chased a draft in the cellar; the jars might still be rattling.",
            ],
            guilty_lines: &[
                "Relax, the only blood you'll find is from the roast earlier.",
                "If anyone was nervous, it was Ava whispering logistics.",
                "I was cleaning knives; that's what chefs do. Stop prying.",
            ],
        },
        CastMember {
            name: "Dax",
            persona: "an engineer who trusts numbers more than people",
            inquisitive_lines: &[
                "Explain why the generator flickered at eleven",
                "Show me the data that puts you anywhere but the hallway",
                "Account for the missing set of spare keys",
            ],
            defensive_lines: &[
                "I was recalibrating the meters; the logs file is on the console.",
                "Check the diagnostics—I'm the reason the lights stayed on.",
                "I inventoried the keys myself. Nothing was missing then.",
            ],
            guilty_lines: &[
                "My instruments were spotless; maybe others can't say the same.",
                "If there's blood, it's because someone mishandled the tools.",
                "Keys go missing all the time when Cora cooks under pressure.",
            ],
        },
    ];
}

/// Build live agents from the static cast, binding `responder` to each
/// when one is given.
pub fn assemble(responder: Option<Arc<dyn Responder>>) -> Vec<Agent> {
    CAST.iter()
        .map(|member| {
            let agent = Agent::new(
                member.name,
                member.persona,
                member.inquisitive_lines,
                member.defensive_lines,
                member.guilty_lines,
            );
            match &responder {
                Some(responder) => agent.with_responder(Arc::clone(responder)),
                None => agent,
            }
        })
        .collect()
}
