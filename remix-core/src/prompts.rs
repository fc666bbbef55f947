//! Prompt builders for generation, scoring, refinement, and critique.

/// Ideation: the core surreal story.
pub fn ideation_prompt(prompt: &str, facts: &[String], tone: &str, style: &str) -> String {
    let facts_text = facts.join("\n");
    format!(
        "You are a skilled fiction writer.\n\
         \n\
         Write a surreal short story based on this prompt:\n\
         \n\
         \"{prompt}\"\n\
         \n\
         Use the following strange facts as inspiration (you can twist or reinterpret them):\n\
         {facts_text}\n\
         \n\
         Match this tone: {tone}\n\
         Match this style: {style}\n\
         \n\
         Requirements:\n\
         - 4-7 paragraphs.\n\
         - Narrative, story-like prose (clear beginning, middle, and end).\n\
         - Use normal paragraphs with line breaks, NOT bullet points or lists.\n\
         - No headings like \"Chapter 1\" unless really needed."
    )
}

/// Branching: a full standalone retelling of the core story under a twist.
pub fn branch_rewrite_prompt(core_idea: &str, twist: &str) -> String {
    format!(
        "You are rewriting a surreal short story.\n\
         \n\
         Original story (for reference):\n\
         {core_idea}\n\
         \n\
         Now write an ALTERNATE VERSION of this story with the following twist:\n\
         \"{twist}\"\n\
         \n\
         Requirements:\n\
         - It should be a complete standalone story (do not just list options).\n\
         - 4-7 paragraphs.\n\
         - Narrative, story-like prose with line breaks between paragraphs.\n\
         - No lists, no bullet points, no \"Branch\" labels in the text."
    )
}

/// Evaluation: emotional-resonance score request for one branch.
pub fn resonance_score_prompt(story: &str) -> String {
    format!(
        "Score the following story on emotional resonance from 1 to 5.\n\
         \n\
         Story:\n\
         {story}\n\
         \n\
         First line MUST be exactly: \"Score: <number between 1 and 5>\"\n\
         Then give 2-3 sentences of explanation."
    )
}

/// Evaluation: rewrite request for a branch judged low on resonance.
pub fn refine_prompt(story: &str) -> String {
    format!(
        "This story was judged as low emotional resonance.\n\
         \n\
         Please rewrite it to be more emotionally engaging, but keep the surreal style.\n\
         \n\
         Story:\n\
         {story}\n\
         \n\
         Requirements:\n\
         - 4-7 paragraphs.\n\
         - Narrative, story-like prose.\n\
         - No lists or bullet points."
    )
}

/// Judge: generic score request on the given criteria.
pub fn judge_prompt(content: &str, criteria: &str) -> String {
    format!(
        "Judge the following content on {criteria}.\n\
         Return the first line strictly as 'Score: <number between 1 and 5>'.\n\
         Then give a short explanation.\n\
         \n\
         Content:\n\
         {content}"
    )
}

/// Critique: review of a whole run's serialized state.
pub fn critic_prompt(state_json: &str) -> String {
    format!(
        "You are a critic agent reviewing an AI agent's trajectory.\n\
         Assess the path for efficiency, coherence, and errors.\n\
         Suggest concrete fixes and improvements.\n\
         \n\
         Trajectory state:\n\
         {state_json}"
    )
}
