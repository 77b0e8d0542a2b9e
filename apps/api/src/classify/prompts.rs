// All LLM prompt constants for the classification module.
// The rubric lives entirely in the prompt: topic assignment is lexical and
// rule-described here, not separately coded logic.

/// System prompt for sentiment classification — enforces JSON-only output.
pub const CLASSIFY_SYSTEM: &str =
    "You are a sentiment analysis engine for customer reviews of food and \
    hospitality businesses, fluent in Indonesian and English. \
    You MUST respond with valid JSON only — a JSON array of result objects. \
    Do NOT include any text outside the JSON array. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Classification prompt template. Replace `{review_lines}` before sending.
pub const CLASSIFY_PROMPT_TEMPLATE: &str = r#"Classify the sentiment and topic of every customer review listed below.

Return a JSON ARRAY with EXACTLY one object per review (no extra fields):
[
  {
    "mentionId": "csv-row-1",
    "sentiment": "positive",
    "score": 0.85,
    "entity": "Quality"
  }
]

SENTIMENT (pick exactly one):
- "positive": satisfaction, praise, recommendation — "enak", "mantap", "bagus", "ramah", "puas", "recommended", "great", "love"
- "negative": complaints, disappointment — "lelet", "lambat", "mahal", "kotor", "kecewa", "buruk", "bad", "terrible"
- "neutral": factual statements, mixed or unclear signals — "oke", "standar", "biasa aja"

SCORE (number between 0.0 and 1.0):
- 0.0-0.3: very negative
- 0.3-0.5: negative
- 0.5: neutral
- 0.5-0.7: positive
- 0.7-1.0: very positive

ENTITY (pick exactly one; when several apply, the FIRST matching rule wins):
1. "Service": staff behavior, waiting time, delivery — "pelayanan", "pelayan", "kasir", "lelet", "lambat", "ramah", "service", "staff", "waiter"
2. "Quality": taste, freshness, product quality — "enak", "rasa", "gurih", "segar", "porsi", "taste", "food", "quality"
3. "Price": cost and value for money — "harga", "mahal", "murah", "worth it", "price", "expensive", "cheap"
4. "Ambiance": atmosphere, cleanliness, comfort — "suasana", "tempat", "bersih", "kotor", "nyaman", "cozy", "atmosphere", "decor"
5. "Location": accessibility, parking — "lokasi", "parkir", "akses", "strategis", "location", "parking"
6. "General": everything else, or no clear topic

HARD RULES:
1. EVERY review MUST appear exactly once, with `mentionId` copied verbatim from its listing
2. `sentiment` MUST be one of: positive, neutral, negative
3. `entity` MUST be one of: Quality, Service, Price, Ambiance, Location, General
4. Never skip a review, even when its text is ambiguous — use "neutral" with score 0.5

REVIEWS:
{review_lines}"#;
