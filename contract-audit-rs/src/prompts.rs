//! Prompt templates for the contract operations

/// Longest contract text sent to the model, in characters
pub const MAX_CONTRACT_CHARS: usize = 4000;

/// Shorten `text` to at most `max_chars` characters before prompting.
///
/// The cut falls after the last full stop when that lies past the halfway
/// mark, otherwise after the last space. A warning line is appended so the
/// model knows the text is partial. Text within the limit is returned as is.
pub fn truncate_contract(text: &str, max_chars: usize) -> String {
    let Some((cut, _)) = text.char_indices().nth(max_chars) else {
        return text.to_string();
    };
    let head = &text[..cut];

    let sentence_end = head
        .rfind('.')
        .filter(|&idx| head[..idx].chars().count() > max_chars / 2);
    let end = match sentence_end.or_else(|| head.rfind(' ')) {
        Some(idx) => idx + 1,
        None => head.len(),
    };
    let kept = &head[..end];

    format!(
        "{}\n\n[WARNING: Contract has been truncated to {} characters for processing. The full analysis may be limited.]",
        kept,
        kept.chars().count()
    )
}

/// Compliance review prompt
pub fn analysis_prompt(contract_text: &str) -> String {
    format!(
        r#"You are a legal AI assistant specializing in startup compliance.
Current YC SAFE version: 2023. Always reference Delaware Corp Law and SEC Reg D when applicable.

Analyze this contract for legal compliance. List potential issues or violations with:
1. Severity (High/Medium/Low)
2. Relevant law or regulation reference
3. Suggested fix
4. YC template reference (if applicable)

Format your response as JSON with the following structure:
{{
  "summary": "Brief overview of the contract",
  "issues": [
    {{
      "severity": "High",
      "description": "Description of the issue",
      "law": "Relevant law reference",
      "fix": "Suggested fix",
      "ycReference": "YC template reference (if applicable)"
    }}
  ],
  "overallRisk": "High/Medium/Low",
  "complianceScore": 0-100
}}

CONTRACT TEXT:
{}"#,
        contract_text
    )
}

/// Negotiation simulation prompt
pub fn negotiation_prompt(clause_text: &str, perspective: &str) -> String {
    format!(
        r#"You are an expert in legal negotiations for startup funding agreements.

Simulate how a negotiation would play out for the following clause from the perspective of a {}.

CLAUSE:
{}

FORMAT YOUR RESPONSE AS JSON with this structure:
{{
  "originalClause": "The original clause text",
  "analysis": "Brief analysis of the clause from the perspective",
  "negotiationPoints": [
    {{
      "point": "Specific point to negotiate",
      "justification": "Why this point matters",
      "suggestedRevision": "How the clause could be rewritten"
    }}
  ],
  "suggestedResponse": "A suggested verbal response in a negotiation"
}}"#,
        perspective, clause_text
    )
}

/// YC SAFE template comparison prompt
pub fn comparison_prompt(contract_text: &str) -> String {
    format!(
        r#"You are a legal AI assistant specializing in startup funding agreements.

Compare the following contract with the latest YC SAFE template (2023 version).
Identify differences, missing elements, or additions that are not standard in the YC template.

FORMAT YOUR RESPONSE AS JSON with this structure:
{{
  "summary": "Brief overview of how the contract compares to YC SAFE",
  "adherence": "High/Medium/Low - how closely it follows YC SAFE template",
  "differences": [
    {{
      "section": "Section name or area of difference",
      "ycVersion": "What the YC template contains",
      "contractVersion": "What this contract contains",
      "impact": "The potential legal or business impact of this difference",
      "recommendation": "Recommendation on how to address this"
    }}
  ],
  "missingElements": [
    {{
      "element": "Name of missing element",
      "importance": "High/Medium/Low",
      "impact": "Impact of this omission",
      "recommendation": "How to address this"
    }}
  ]
}}

CONTRACT TEXT:
{}"#,
        contract_text
    )
}
