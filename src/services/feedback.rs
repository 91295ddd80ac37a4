use crate::domain::models::{Feedback, FeedbackEntry, Trait, TraitScores};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    High,
    Mid,
    Low,
}

impl Bucket {
    /// Boundary values belong to the higher bucket.
    pub fn for_score(score: f64) -> Self {
        if score >= 4.0 {
            Bucket::High
        } else if score >= 3.0 {
            Bucket::Mid
        } else {
            Bucket::Low
        }
    }
}

struct Copywriting {
    narrative: &'static str,
    roles: &'static [&'static str],
    actions: &'static [&'static str],
}

/// Copy table for every (trait, bucket) pair.
fn copy_for(t: Trait, bucket: Bucket) -> Copywriting {
    match (t, bucket) {
        (Trait::Extraversion, Bucket::High) => Copywriting {
            narrative: "你像一瓶前調強烈的香氛，進場即照亮全場。你擅長主動互動、引領議題並在社交場合獲得能量。",
            roles: &["公關/活動企劃", "業務開發", "講師/培訓師", "品牌發言人"],
            actions: &[
                "承接一次 5-10 分鐘的公開演說練習表達力。",
                "每月至少參加一次業界交流擴展人脈。",
            ],
        },
        (Trait::Extraversion, Bucket::Mid) => Copywriting {
            narrative: "你在社交場合表現穩定，能在需要時展現熱情但也懂得回收能量。",
            roles: &["專案經理", "客戶顧問", "產品經理"],
            actions: &[
                "練習 30 秒電梯簡報以清晰表達重點。",
                "每週安排短時社交活動，維持人脈溫度。",
            ],
        },
        (Trait::Extraversion, Bucket::Low) => Copywriting {
            narrative: "你內斂且深具觀察力，適合需要專注與深度思考的工作情境。",
            roles: &["研究/分析", "後端工程師", "編輯"],
            actions: &["以 1 對 1 形式建立深度人脈。", "練習用 1 分鐘說出一個觀點。"],
        },
        (Trait::Agreeableness, Bucket::High) => Copywriting {
            narrative: "你如中調般柔和，具高同理與合作力，擅長團隊溝通與支持他人。",
            roles: &["人資/員工關係", "社工/諮商", "客戶成功"],
            actions: &["學習同理式回應技巧。", "每月反思是否過度遷就，學習設立界限。"],
        },
        (Trait::Agreeableness, Bucket::Mid) => Copywriting {
            narrative: "你能兼顧合作與原則，適合協作型角色。",
            roles: &["產品協調", "服務設計"],
            actions: &["用 '描述—感受—建議' 的方式提出改進意見。"],
        },
        (Trait::Agreeableness, Bucket::Low) => Copywriting {
            narrative: "你偏向直言與堅持原則，適合需判斷力與決策的工作。",
            roles: &["風險管理", "品質管理", "策略分析"],
            actions: &["練習以建設性語句提出批評（先肯定→再建議）。"],
        },
        (Trait::Conscientiousness, Bucket::High) => Copywriting {
            narrative: "你像基調穩定的香料，可靠、具責任感並注重細節。",
            roles: &["專案經理", "資料分析師", "供應鏈管理"],
            actions: &["使用 sprint 拆解大型專案並逐步檢核。"],
        },
        (Trait::Conscientiousness, Bucket::Mid) => Copywriting {
            narrative: "你有良好執行力與規劃性，能平衡彈性與紀律。",
            roles: &["操作管理", "產品協調"],
            actions: &["為關鍵任務設定里程碑並檢核。"],
        },
        (Trait::Conscientiousness, Bucket::Low) => Copywriting {
            narrative: "你偏好彈性與創意，適合需要適應力與即興的職務。",
            roles: &["創意職位", "研究與概念開發"],
            actions: &["採時間盒（time-boxing）提升專注度。"],
        },
        (Trait::Neuroticism, Bucket::High) => Copywriting {
            narrative: "你情緒較敏感、警覺性高，這讓你能提前察覺風險。",
            roles: &["風險管理（配合支援）", "品質把關"],
            actions: &["建立情緒日誌以辨識壓力來源。", "每日 5-10 分鐘腹式呼吸/正念。"],
        },
        (Trait::Neuroticism, Bucket::Mid) => Copywriting {
            narrative: "情緒波動在可控範圍，建議持續使用壓力管理技巧。",
            roles: &["多數專業職務（有支援）"],
            actions: &["模擬重要場合以降低焦慮感。"],
        },
        (Trait::Neuroticism, Bucket::Low) => Copywriting {
            narrative: "你情緒穩定，是團隊的穩定力量。",
            roles: &["管理職", "高壓判斷角色"],
            actions: &["維持情緒管理習慣並與團隊分享。"],
        },
        (Trait::Openness, Bucket::High) => Copywriting {
            narrative: "你充滿好奇與創意，適合跨領域與概念驅動的工作。",
            roles: &["創意總監", "產品設計", "研究創新"],
            actions: &["建立靈感庫並定期回顧做組合創新。"],
        },
        (Trait::Openness, Bucket::Mid) => Copywriting {
            narrative: "你具開放性與探索力，能在實務中帶入創意。",
            roles: &["產品企劃", "設計研究"],
            actions: &["每周閱讀一篇跨領域文章並做摘要。"],
        },
        (Trait::Openness, Bucket::Low) => Copywriting {
            narrative: "你偏好結構化與深耕，適合需要專精的工作。",
            roles: &["技術研發", "流程改善"],
            actions: &["用結構化方法（PDCA）導入改良。"],
        },
    }
}

pub fn feedback_for(t: Trait, score: f64) -> FeedbackEntry {
    let copy = copy_for(t, Bucket::for_score(score));
    FeedbackEntry {
        score,
        narrative: copy.narrative.to_string(),
        suggested_roles: copy.roles.iter().map(|s| s.to_string()).collect(),
        suggested_actions: copy.actions.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn resolve_feedback(scores: &TraitScores) -> Feedback {
    scores
        .iter()
        .map(|(t, score)| (*t, feedback_for(*t, *score)))
        .collect()
}
