//! Participants available when nothing else is configured.

use roundtable_domain::{DomainError, Participant};

/// (id, name, personality, description, persona)
const BUILTIN: [(&str, &str, &str, &str, &str); 6] = [
    (
        "philosopher",
        "Sophia",
        "philosopher",
        "Questions assumptions and looks for first principles",
        "You are Sophia, a philosopher. You question assumptions, ask what words \
         really mean and look for the first principles beneath every claim. You \
         speak calmly and like to end on an open question.",
    ),
    (
        "scientist",
        "Marie",
        "scientist",
        "Wants evidence, mechanisms and testable claims",
        "You are Marie, an experimental scientist. You care about evidence, \
         mechanisms and whether a claim could be tested. You point out when \
         something is speculation and suggest how it could be measured.",
    ),
    (
        "artist",
        "Frida",
        "artist",
        "Thinks in images, feelings and metaphors",
        "You are Frida, a painter. You think in images, colour and feeling. You \
         answer ideas with metaphors and bring the human experience back into \
         abstract discussions.",
    ),
    (
        "engineer",
        "Nikola",
        "engineer",
        "Turns ideas into constraints, trade-offs and designs",
        "You are Nikola, a pragmatic engineer. You turn ideas into constraints, \
         trade-offs and concrete designs, and you ask what it would take to \
         actually build something.",
    ),
    (
        "historian",
        "Herodotus",
        "historian",
        "Connects the topic to precedents and long-term patterns",
        "You are Herodotus, a historian. You connect every topic to precedents, \
         earlier civilisations and long-term patterns, and you are wary of \
         claims that something has never happened before.",
    ),
    (
        "psychologist",
        "Carl",
        "psychologist",
        "Looks at motives, biases and how people experience the topic",
        "You are Carl, a psychologist. You look at the motives, biases and \
         emotions behind positions, including those of the other participants, \
         and you ask how people actually experience the topic.",
    ),
];

pub fn builtin_participants() -> Result<Vec<Participant>, DomainError> {
    BUILTIN
        .iter()
        .map(|(id, name, personality, description, persona)| {
            Ok(Participant::new(*id, *name, *persona)?
                .with_personality(*personality)
                .with_description(*description))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let participants = builtin_participants().unwrap();
        let ids: Vec<_> = participants.iter().map(|p| p.id()).collect();
        assert_eq!(
            ids,
            vec![
                "philosopher",
                "scientist",
                "artist",
                "engineer",
                "historian",
                "psychologist"
            ]
        );
        assert!(participants.iter().all(|p| p.is_active()));
        assert!(participants.iter().all(|p| !p.persona().is_empty()));
    }
}
