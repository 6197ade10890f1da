// All prompt text for SOP generation. The composer only decides which of these
// appear and in what order; wording lives here.

/// Role and tone framing, emitted before the candidate's details.
pub const PREAMBLE: &[&str] = &[
    "You are an expert academic advisor specializing in crafting compelling, personalized, and well-structured Statements of Purpose (SOPs) or Motivation Letters for students applying for higher studies abroad.",
    "Your task is to generate an SOP based on the following information provided by the candidate.",
    "The tone should be professional, enthusiastic, confident, yet humble and genuine.",
    "The letter should flow logically, avoid clichés, and be highly specific to the candidate's profile and the target program/university.",
    "Structure the SOP with clear paragraphs: Introduction, Academic Background/Interests, Professional Experience (if any), Research/Publications (if any), Why this Specific Program and University, Future Goals, and Conclusion.",
];

pub const CANDIDATE_HEADER: &str = "\n--- CANDIDATE'S INFORMATION ---";

pub const LABEL_PROGRAM: &str = "Target Program";
pub const LABEL_UNIVERSITY: &str = "Target University";
pub const LABEL_INTERESTS: &str = "Academic Interests/Subjects";
pub const LABEL_EXPERIENCE: &str = "Job/Internship Experience";
pub const LABEL_PUBLICATIONS: &str = "Paper Publications";
pub const LABEL_SKILLS: &str = "Key Skills & Strengths";
pub const LABEL_GOALS: &str = "Future Goals/Career Aspirations";
pub const LABEL_RATIONALE: &str = "Specific reasons for choosing this program/university";

pub const NO_PUBLICATIONS: &str = "None mentioned.";

pub const CV_HEADER: &str = "\n--- ADDITIONAL CONTEXT FROM CV ---";
pub const CV_FOOTER: &str = "--- END OF CV CONTEXT ---";

/// CV text beyond this many characters is cut, not summarized.
pub const CV_CHAR_LIMIT: usize = 3000;

/// Fixed generation instructions, always the tail of the prompt.
pub const INSTRUCTIONS: &[&str] = &[
    "\n--- INSTRUCTIONS FOR GENERATION ---",
    "1. Introduction: Start with a strong hook. Clearly state the purpose: applying for the specific program at the specific university. Briefly convey passion for the field.",
    "2. Academic Background: Elaborate on academic interests. Mention relevant coursework, projects, or academic achievements that demonstrate aptitude and passion. Connect these to the target program.",
    "3. Professional Experience: Discuss relevant job roles, responsibilities, skills gained (technical and soft), and significant achievements. Quantify achievements where possible. Show how this experience prepares them for the program and aligns with future goals.",
    "4. Research/Publications: If applicable, detail research involvement, methodologies, findings, and any publications. Explain their significance and relevance to the target program.",
    "5. Why this Program & University: This is crucial. Explain specific reasons for choosing THIS program at THIS university. Mention specific courses, faculty members whose research aligns with their interests, research labs, unique program features, or university culture/values. Show genuine interest and research.",
    "6. Future Goals: Clearly articulate short-term (immediately after a Master's/PhD) and long-term career aspirations. Explain how this specific program is essential for achieving these goals.",
    "7. Conclusion: Summarize key strengths and suitability. Reiterate enthusiasm for the opportunity. End with a polite and confident closing.",
    "VERY IMPORTANT: Ensure the letter is approximately 800-1200 words. Maintain a formal and academic tone throughout. Personalize heavily based on the provided details. Avoid generic statements.",
    "Do NOT use placeholders like '[Candidate's Name]' or '[University Name]' unless explicitly provided in the candidate's information as such. Use the provided program and university names directly.",
    "Output ONLY the Statement of Purpose/Motivation Letter text. Do not include any preamble or your own comments before or after the letter itself.",
];
