use serde::{Deserialize, Serialize};

/// A single care instruction ("Machine wash at 30ºC").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareInstruction {
    pub description: String,
}

impl CareInstruction {
    pub fn new(description: impl Into<String>) -> Self {
        Self { description: description.into() }
    }

    /// Joins a list of instructions into the one-line text form stored in
    /// item metadata: sentences separated and terminated by full stops.
    pub fn render(instructions: &[CareInstruction]) -> String {
        if instructions.is_empty() {
            return String::new();
        }
        let mut out = instructions.iter().map(|i| i.description.as_str()).collect::<Vec<_>>().join(". ");
        out.push('.');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_joins_sentences() {
        let instructions =
            vec![CareInstruction::new("Machine wash at 30ºC"), CareInstruction::new("Do not tumble dry")];
        assert_eq!(CareInstruction::render(&instructions), "Machine wash at 30ºC. Do not tumble dry.");
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(CareInstruction::render(&[]), "");
    }
}
