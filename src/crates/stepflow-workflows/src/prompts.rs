//! Prompt templates used by the workflow nodes

use serde_json::Value;

pub(crate) fn viral_clips(transcript: &str) -> String {
    format!(
        r#"You are a video editor AI. Given the following transcript, return exactly 3 impactful segments for viral videos.
Each clip should be between 20 and 40 seconds long.
Return only a JSON object of the form:
{{"clips": [{{"start_sec": <number>, "duration_sec": <number>, "caption": "<short catchy caption>"}}]}}

Transcript: {transcript}"#
    )
}

pub(crate) fn comment_analysis(comments: &str) -> String {
    format!(
        r#"You are an expert sentiment analyst. Your task is to analyze a list of YouTube comments.
Provide a structured breakdown of the sentiment (positive, negative, neutral) and
identify the key themes or topics mentioned in the comments.

Comments to analyze:
{comments}

Analysis:
- Overall Sentiment:
- Key Themes:
- Positive Comments: (Quote 2-3 examples)
- Negative Comments: (Quote 2-3 examples)
- Neutral/Other Comments: (Quote 2-3 examples)"#
    )
}

pub(crate) fn comment_report(video_url: &str, analysis: &str) -> String {
    format!(
        r#"You are a social media analyst. Based on the following sentiment analysis,
generate a professional and concise report for a client. The report should
summarize the key findings and provide actionable insights.

Video URL: {video_url}

Comment Analysis:
{analysis}

Final Report:"#
    )
}

pub(crate) fn content_ideas(niche: &str, platform: &str) -> String {
    format!(
        r#"You are a content trend analyst for {platform}.
Based on the niche: {niche}, generate 5 highly engaging content ideas.
Return ONLY a JSON object of the form:
{{"ideas": [{{"title": "<idea title>", "summary": "<one or two sentence summary>"}}]}}
Do NOT include any conversational text or code block syntax."#
    )
}

pub(crate) fn linkedin_post(niche: &str, title: &str, summary: &str) -> String {
    format!(
        r#"You are a LinkedIn ghostwriter for a creator in the {niche} niche.
Write an engaging LinkedIn post based on the idea below. Open with a strong hook,
keep paragraphs short, end with a question that invites comments, and add 3 to 5
relevant hashtags. Return only the post text.

Idea: {title}
Summary: {summary}"#
    )
}

pub(crate) fn youtube_script(niche: &str, title: &str, summary: &str) -> String {
    format!(
        r#"You are a YouTube scriptwriter for a channel in the {niche} niche.
Write a video script based on the idea below with a hook for the first 15 seconds,
an intro, three main sections and a call to action. Mark each section with a heading.
Return only the script.

Idea: {title}
Summary: {summary}"#
    )
}

pub(crate) fn sponsorship_mail(state: &Value) -> String {
    let field = |name: &str| match state.get(name) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "n/a".to_string(),
        Some(other) => other.to_string(),
    };

    format!(
        r#"You are an expert ghostwriter for a social media influencer. Your task is to draft a professional, concise, and compelling sponsorship email.
Here is the influencer's data:
- Niche: {}
- YouTube Subscribers: {}
- Instagram Followers: {}
- LinkedIn Followers: {}
- YouTube Profile: {}
- Instagram Profile: {}
- LinkedIn Profile: {}
Draft a short email suitable for a marketing department. The tone should be friendly yet professional. Clearly state the influencer's niche, audience size, and a brief value proposition. Do not include a subject line or a salutation. End with "Best regards," followed by "Influencer's Name".
Draft:"#,
        field("niche"),
        field("youtube_subscribers"),
        field("insta_followers"),
        field("linkedin_followers"),
        field("youtube_url"),
        field("insta_url"),
        field("linkedin_url"),
    )
}
