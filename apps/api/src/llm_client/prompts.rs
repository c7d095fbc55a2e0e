// Prompt fragments shared by every feature that calls the model. Feature
// prompts live in a prompts.rs next to the feature and build on these.

/// Appended to every system prompt; the callers parse the answer as JSON.
pub const JSON_ONLY_SYSTEM: &str = "Answer with a single valid JSON object and nothing else: \
    no prose before or after it, no markdown fences, no commentary.";
