/// Built-in example diagrams, one per tab in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    Flowchart,
    Sequence,
    Class,
    Gantt,
}

impl Preset {
    pub const ALL: [Self; 4] = [Self::Flowchart, Self::Sequence, Self::Class, Self::Gantt];

    /// Tab label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Flowchart => "Flowchart",
            Self::Sequence => "Sequence",
            Self::Class => "Class",
            Self::Gantt => "Gantt",
        }
    }

    pub const fn source(self) -> &'static str {
        match self {
            Self::Flowchart => FLOWCHART,
            Self::Sequence => SEQUENCE,
            Self::Class => CLASS,
            Self::Gantt => GANTT,
        }
    }
}

/// Source shown when the editor starts without a file.
pub const DEFAULT_SOURCE: &str = "graph TD
  A[Start] --> B{Is it working?}
  B -->|Yes| C[Great!]
  B -->|No| D[Debug]
  D --> B";

const FLOWCHART: &str = "graph TD
    A[Start] --> B{Is it working?}
    B -->|Yes| C[Great!]
    B -->|No| D[Debug]
    D --> B";

const SEQUENCE: &str = "sequenceDiagram
    Alice->>John: Hello John, how are you?
    John-->>Alice: Great!
    Alice-)John: See you later!";

const CLASS: &str = "classDiagram
    class Animal {
      +name: string
      +eat(): void
      +sleep(): void
    }
    class Dog {
      +bark(): void
    }
    Animal <|-- Dog";

const GANTT: &str = "gantt
    title A Gantt Diagram
    dateFormat  YYYY-MM-DD
    section Section
    A task           :a1, 2023-01-01, 30d
    Another task     :after a1, 20d
    section Another
    Task in sec      :2023-01-12, 12d
    another task     :24d";

/// Snippets for the syntax guide overlay: (title, source).
pub const SYNTAX_GUIDE: [(&str, &str); 2] = [
    (
        "Flowchart",
        "graph TD
    A[Start] --> B{Decision}
    B -->|Yes| C[Result]
    B -->|No| D[Another]",
    ),
    (
        "Sequence Diagram",
        "sequenceDiagram
    Alice->>John: Hello John
    John-->>Alice: Hi Alice",
    ),
];
