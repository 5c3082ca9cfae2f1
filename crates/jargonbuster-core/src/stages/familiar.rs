//! Everyday vocabulary used to spot difficult words.

pub(crate) const FAMILIAR_WORDS: &[&str] = &[
    "able", "above", "accept", "across", "act", "add", "afraid", "after", "afternoon", "again",
    "age", "ago", "agree", "ahead", "air", "alike", "alive", "allow", "almost", "alone", "along",
    "already", "always", "among", "amount", "angry", "animal", "answer", "anybody", "anyone",
    "anything", "apple", "arm", "army", "around", "arrive", "art", "ask", "asleep", "away",
    "baby", "back", "bad", "bag", "ball", "band", "bank", "base", "basket", "bath", "bear",
    "beat", "beautiful", "became", "become", "bed", "began", "begin", "behind", "believe", "bell",
    "belong", "best", "better", "big", "bill", "bird", "birthday", "bit", "bite", "black",
    "blood", "blow", "blue", "board", "boat", "body", "bone", "book", "born", "borrow", "bottle",
    "bottom", "box", "boy", "brain", "bread", "break", "breakfast", "breath", "bring", "broke",
    "brother", "brought", "brown", "build", "built", "burn", "bus", "busy", "buy", "cake", "call",
    "came", "car", "care", "careful", "carry", "case", "cat", "catch", "cause", "cent", "center",
    "chair", "chance", "change", "cheap", "check", "chest", "chicken", "child", "children",
    "choose", "church", "city", "class", "clean", "clear", "climb", "clock", "close", "cloth",
    "clothes", "cloud", "coat", "cold", "color", "come", "common", "cook", "cool", "corn",
    "corner", "cost", "cough", "count", "country", "course", "cover", "cow", "cry", "cup", "cut",
    "dance", "danger", "dark", "date", "daughter", "day", "dead", "deal", "dear", "death",
    "decide", "deep", "desk", "die", "different", "dinner", "dirty", "dish", "doctor", "dog",
    "dollar", "done", "door", "double", "doubt", "draw", "dream", "dress", "drink", "drive",
    "drop", "dry", "duck", "dust", "early", "earth", "east", "easy", "eat", "edge", "egg",
    "eight", "else", "empty", "end", "enough", "enter", "even", "evening", "ever", "every",
    "everybody", "everyone", "everything", "example", "except", "eye", "face", "fact", "fail",
    "fair", "fall", "family", "far", "farm", "fast", "fat", "father", "fear", "feed", "feel",
    "feet", "fell", "felt", "fever", "few", "field", "fight", "fill", "find", "fine", "finger",
    "finish", "fire", "first", "fish", "fit", "five", "fix", "flat", "floor", "flower", "fly",
    "follow", "food", "foot", "force", "forget", "form", "forward", "found", "four", "free",
    "fresh", "friend", "front", "fruit", "full", "fun", "funny", "game", "garden", "gate",
    "gave", "get", "gift", "girl", "give", "glad", "glass", "go", "gold", "gone", "good", "got",
    "grass", "gray", "great", "green", "ground", "group", "grow", "guess", "hair", "half", "hall",
    "hand", "happen", "happy", "hard", "hat", "head", "health", "hear", "heard", "heart", "heat",
    "heavy", "held", "hello", "help", "hide", "high", "hill", "hit", "hold", "hole", "home",
    "hope", "horse", "hospital", "hot", "hour", "house", "huge", "hungry", "hurry", "hurt",
    "ice", "idea", "ill", "important", "inch", "inside", "iron", "island", "job", "join", "joke",
    "jump", "keep", "kept", "key", "kid", "kill", "kind", "king", "kitchen", "knee", "knew",
    "know", "lady", "lake", "land", "large", "last", "late", "laugh", "lay", "lead", "learn",
    "least", "leave", "left", "leg", "less", "lesson", "let", "letter", "lie", "life", "lift",
    "light", "like", "line", "lip", "list", "listen", "little", "live", "long", "look", "lose",
    "lost", "lot", "loud", "love", "low", "lunch", "machine", "made", "mail", "main", "make",
    "man", "many", "map", "mark", "market", "matter", "meal", "mean", "measure", "meat",
    "medicine", "meet", "men", "middle", "might", "mile", "milk", "mind", "minute", "miss",
    "money", "month", "moon", "morning", "mother", "mountain", "mouth", "move", "much", "music",
    "name", "narrow", "near", "neck", "need", "never", "new", "news", "next", "nice", "night",
    "nine", "nobody", "noise", "none", "noon", "nose", "note", "nothing", "notice", "number",
    "nurse", "ocean", "office", "often", "oil", "old", "one", "open", "order", "outside", "page",
    "pain", "paint", "pair", "paper", "parent", "park", "part", "party", "pass", "past", "pay",
    "people", "person", "pick", "picture", "piece", "pill", "place", "plan", "plant", "play",
    "please", "pocket", "point", "poor", "possible", "pound", "power", "present", "pretty",
    "price", "problem", "promise", "proud", "pull", "push", "put", "question", "quick", "quiet",
    "race", "rain", "ran", "reach", "read", "ready", "real", "reason", "red", "remember", "rest",
    "rich", "ride", "right", "ring", "river", "road", "rock", "room", "round", "rule", "run",
    "sad", "safe", "said", "salt", "same", "sat", "save", "saw", "say", "school", "sea", "seat",
    "second", "see", "seem", "seen", "sell", "send", "sent", "seven", "shake", "shape", "share",
    "sharp", "ship", "shoe", "shop", "short", "shot", "shoulder", "show", "shut", "sick", "side",
    "sign", "simple", "sing", "sister", "sit", "six", "size", "skin", "sky", "sleep", "slow",
    "small", "smell", "smile", "snow", "soft", "sold", "son", "song", "soon", "sore", "sorry",
    "sound", "south", "speak", "spend", "spot", "spring", "stand", "star", "start", "stay",
    "step", "stick", "still", "stomach", "stone", "stop", "store", "story", "straight",
    "strange", "street", "strong", "study", "such", "sudden", "sugar", "summer", "sun", "sure",
    "surprise", "sweet", "swim", "table", "take", "talk", "tall", "taste", "teach", "team",
    "tear", "teeth", "tell", "ten", "test", "thank", "thick", "thin", "thing", "think", "third",
    "though", "thought", "three", "threw", "throat", "throw", "time", "tired", "today",
    "together", "told", "tomorrow", "tonight", "took", "tooth", "top", "touch", "toward", "town",
    "toy", "train", "tree", "trip", "trouble", "true", "try", "turn", "twice", "two", "under",
    "understand", "use", "useful", "usual", "visit", "voice", "wait", "wake", "walk", "wall",
    "want", "war", "warm", "wash", "watch", "water", "way", "weak", "wear", "weather", "week",
    "weight", "well", "went", "west", "wet", "wheel", "whole", "wide", "wife", "wild", "win",
    "wind", "window", "winter", "wish", "woman", "women", "wonder", "wood", "word", "work",
    "world", "worry", "worse", "write", "wrong", "yard", "year", "yellow", "yes", "yesterday",
    "yet", "young",
];
