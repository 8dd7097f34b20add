// Prompt Builder for the matching call.
//
// The scoring instruction and the response markers below are one versioned
// unit: the parser reads exactly the format the instruction asks for. Bump
// PROMPT_VERSION whenever either side changes.

use std::fmt::Write;

use crate::matching::models::MatchCandidate;
use crate::models::user::UserProfile;

pub const PROMPT_VERSION: &str = "matching-v2";

/// Delimiter wrapping the program name line in the response.
pub const NAME_DELIMITER: &str = "**";
/// Marker of the score line, followed by a zero-padded two-digit score.
pub const SCORE_MARKER: &str = "- 점수";
/// Marker of the rationale line.
pub const RATIONALE_MARKER: &str = "- 분석";
/// Width of the score slot read after the score marker, e.g. `"09점"`.
pub const SCORE_SLOT_WIDTH: usize = 5;
/// Scores strictly above this are recommended.
pub const SCORE_THRESHOLD: u8 = 7;

pub const SCORING_INSTRUCTION: &str = r#"
위의 사용자 정보와 지원사업 정보를 분석하여, 사용자의 사업분야와 사업내용에 가장 적합한 지원사업을 선택해주세요.

분석 기준:
1. 사용자의 사업분야와 지원사업의 분야 일치도
2. 사용자의 사업내용과 지원사업 내용의 연관성
3. 지원사업의 구체성과 실용성

각 지원사업에 대해 0-10점의 적합도 점수를 매겨주세요. 7점보다 높은 지원사업만 추천 대상입니다.
점수는 항상 두 자리 숫자로 적어주세요 (예: 05점, 08점, 10점).
지원사업 이름은 위 목록의 사업명을 그대로 적어주세요.

응답 형식 (지원사업마다 아래 세 줄을 반복):
**{지원사업 이름}**
- 점수 {두 자리 점수}점
- 분석 {선택 이유}
"#;

/// Builds the full matching prompt: user block, enumerated candidates, instruction.
pub fn build_matching_prompt(profile: &UserProfile, candidates: &[MatchCandidate]) -> String {
    let mut prompt = format!(
        "\n사용자 정보:\n- 사업분야: {}\n- 사업내용: {}\n",
        profile.category_list(),
        profile.business_summary
    );

    for (i, candidate) in candidates.iter().enumerate() {
        // Writing into a String cannot fail.
        let _ = write!(
            prompt,
            "\n지원사업 {}:\n- 사업명: {}\n- 사업내용: {}\n",
            i + 1,
            candidate.program.name,
            candidate.program.summary
        );
    }

    prompt.push_str(SCORING_INSTRUCTION);
    prompt
}
