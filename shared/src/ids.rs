use rand::Rng;

/// Random 16-hex-digit id for entities a client creates on its own (its
/// player). Server-generated entities use [`IdGenerator`] instead.
pub fn random_id() -> String {
    let value: u64 = rand::thread_rng().gen();
    format!("{:016x}", value)
}

/// Sequential ids with a fixed prefix. Never reuses a value, including
/// across world resets.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    prefix: String,
    next: u64,
}

impl IdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }

    pub fn next_id(&mut self) -> String {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}
