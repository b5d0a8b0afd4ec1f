//! Token language classification and closed-class word lists
//!
//! Tokens reaching this module have already been lowercased and reduced to
//! letters only. A token is classified by its character set; anything that
//! mixes alphabets resolves to neither language and is skipped upstream.

/// Languages the lemmatizer understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Russian,
    English,
}

/// Classifies a lowercase letters-only token by character set
pub fn classify(token: &str) -> Option<Language> {
    if token.is_empty() {
        return None;
    }

    if token.chars().all(is_cyrillic_letter) {
        Some(Language::Russian)
    } else if token.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(Language::English)
    } else {
        None
    }
}

/// Checks for a lowercase Cyrillic letter
pub fn is_cyrillic_letter(c: char) -> bool {
    matches!(c, 'а'..='я' | 'ё')
}

/// Russian closed-class words: carriers of grammar, not content
///
/// Conjunctions, prepositions, particles, pronouns, interjections and
/// common introductory words. These are finite classes, so an embedded
/// list stands in for part-of-speech tagging.
pub const RUSSIAN_CLOSED_CLASS: &[&str] = &[
    // conjunctions
    "и", "а", "но", "да", "или", "либо", "что", "чтобы", "как", "когда", "пока", "если",
    "хотя", "чем", "будто", "словно", "тоже", "также", "зато", "однако", "причем", "притом",
    "потому", "поэтому", "ибо", "дабы", "ежели", "нежели",
    // prepositions
    "в", "во", "на", "за", "к", "ко", "с", "со", "по", "о", "об", "обо", "от", "ото", "до",
    "из", "изо", "у", "при", "про", "для", "без", "безо", "под", "подо", "над", "надо",
    "между", "меж", "через", "чрез", "перед", "передо", "пред", "около", "возле", "вдоль",
    "вне", "внутри", "среди", "против", "вместо", "кроме", "сквозь", "ради", "мимо",
    "после", "согласно", "благодаря", "вопреки",
    // particles
    "не", "ни", "ли", "ль", "бы", "б", "же", "ж", "ведь", "вот", "вон", "даже", "лишь",
    "только", "уже", "уж", "именно", "почти", "разве", "неужели", "пусть", "пускай",
    "бывало", "чуть", "якобы", "мол", "аж", "хоть",
    // pronouns
    "я", "ты", "он", "она", "оно", "мы", "вы", "они", "себя", "меня", "тебя", "его", "её",
    "нас", "вас", "их", "мне", "тебе", "ему", "ей", "нам", "вам", "им", "мной", "тобой",
    "нами", "вами", "ими", "нём", "ней", "них", "кто", "какой", "каков", "чей", "который",
    "сколько", "этот", "эта", "это", "эти", "тот", "та", "то", "те", "такой", "таков",
    "столько", "весь", "вся", "всё", "все", "сам", "сама", "само", "сами", "самый",
    "каждый", "любой", "иной", "другой", "мой", "моя", "моё", "мои", "твой", "твоя",
    "твоё", "твои", "наш", "наша", "наше", "наши", "ваш", "ваша", "ваше", "ваши", "свой",
    "своя", "своё", "свои", "некто", "нечто", "никто", "ничто", "никакой", "ничей",
    // interjections
    "ах", "ох", "эх", "ай", "ой", "эй", "ух", "увы", "ура", "браво", "алло", "ага", "угу",
    "фу", "тьфу", "ишь", "ну",
    // introductory words
    "конечно", "наверное", "возможно", "кажется", "пожалуй", "вероятно", "впрочем",
    "например", "итак", "значит", "словом", "кстати", "вообще", "действительно",
    "безусловно", "несомненно", "видимо", "допустим", "собственно",
];

/// English closed-class words
///
/// Articles, conjunctions, prepositions, particles, pronouns and
/// interjections.
pub const ENGLISH_CLOSED_CLASS: &[&str] = &[
    // articles
    "a", "an", "the",
    // conjunctions
    "and", "but", "or", "nor", "for", "yet", "so", "because", "although", "though",
    "while", "whereas", "unless", "until", "since", "than", "whether", "that", "once",
    "when", "whenever", "where", "wherever", "if",
    // prepositions
    "about", "above", "across", "after", "against", "along", "among", "around", "at",
    "before", "behind", "below", "beneath", "beside", "besides", "between", "beyond",
    "by", "despite", "down", "during", "except", "from", "in", "inside", "into", "near",
    "of", "off", "on", "onto", "out", "outside", "over", "past", "through", "throughout",
    "till", "to", "toward", "towards", "under", "underneath", "up", "upon", "with",
    "within", "without",
    // particles
    "not",
    // pronouns
    "i", "me", "my", "mine", "myself", "we", "us", "our", "ours", "ourselves", "you",
    "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself", "she",
    "her", "hers", "herself", "it", "its", "itself", "they", "them", "their", "theirs",
    "themselves", "who", "whom", "whose", "which", "what", "this", "these", "those",
    "anyone", "anybody", "anything", "everyone", "everybody", "everything", "someone",
    "somebody", "something", "none", "nobody", "nothing", "each", "either", "neither",
    "both", "few", "many", "several", "all", "any", "most", "some", "such",
    // interjections
    "oh", "ah", "wow", "ouch", "hey", "alas", "hooray", "hmm", "oops", "ugh",
];
