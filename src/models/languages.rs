/// Output languages offered to the user. The first entry is the default.
pub const SUPPORTED_LANGUAGES: [&str; 50] = [
    "English", "Spanish", "French", "German", "Chinese", "Japanese", "Korean", "Russian",
    "Italian", "Portuguese", "Dutch", "Swedish", "Norwegian", "Danish", "Finnish", "Polish",
    "Turkish", "Arabic", "Hebrew", "Hindi", "Indonesian", "Vietnamese", "Thai", "Greek", "Czech",
    "Hungarian", "Romanian", "Ukrainian", "Slovak", "Croatian", "Bulgarian", "Lithuanian",
    "Latvian", "Estonian", "Slovenian", "Maltese", "Icelandic", "Irish", "Basque", "Catalan",
    "Galician", "Filipino", "Malay", "Swahili", "Afrikaans", "Zulu", "Xhosa", "Persian", "Urdu",
    "Bengali",
];
