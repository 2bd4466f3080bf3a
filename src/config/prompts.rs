// src/config/prompts.rs

use serde::{Deserialize, Serialize};
use std::fmt;

// Job-posting passage the Japanese extraction prompts run against.
macro_rules! job_posting {
    () => {
        "音声認識 (音響/言語モデル適応、End-to-End、ダイアライゼーション、音声強調/分離、音声感情認識、Kaldi/ESPnet活用など)、音響認識 (異常音検知、音響シーン分類、音響イベント検出、キャプション生成など)、時系列信号処理と機械学習 (スパースモデリング、信号復元、状態推定/予測のための機械学習など) のいずれかの研究開発を担当いただきながら、チームメンバーや後進の研究開発の指導を行っていただくことも期待します。いずれは研究チームを引っ張るリーダーとなっていただき、音声/音響/時系列信号処理技術の研究戦略検討や新事業の構想なども担っていただく人財となることを期待します。特に、音声認識に関しては、音声認識業界の経験と最新技術の知識をもとに、新事業（あるいは新研究テーマ）を構想することや、音声認識システムの開発経験と顧客需要の把握にもとづき、最新技術を取り入れた音声認識システムを提案することを期待します"
    };
}

// Research-statement passage for the English extraction prompt.
macro_rules! research_statement {
    () => {
        "私は健康科学の分野でニューラルネットワークによる医療費の予測というテーマで研究を行っています。この研究を一言で表すと、医療費の予測を機械学習ですることで予防医療や重視すべき治療、方針を決定する際の支えとすることです。 この研究テーマの背景として、日本が抱えている大きな問題である高額医療費があります。将来的には私の研究分野の蓄積により医療費の増加を抑え、より必要とされている社会保障をはじめとした他の分野に国の財源を回すことができる可能性があります。 今後もし研究を続けるなら、社会的に意義があり、人々の生活に関わる内容をしたいと考えております。"
    };
}

pub const RESEARCHER_SYSTEM: &str =
    "You are an excellent researcher. You are well-versed in your field of expertise.";

/// Researcher persona plus the JSON shape we expect back.
pub const RESEARCHER_JSON_SYSTEM: &str = "You are an excellent researcher. You are well-versed in your field of expertise.

# Expected JSON response
{\"keywords\":[keyword1, keyword2, ..., keywordN]}
";

/// Built-in user prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prompt {
    ExtractEn,
    ExtractJa,
    SynonymJa,
    ClaudeExtractJa,
    ClaudeSynonymJa,
    GptExtractJa,
    Smoke,
}

impl Prompt {
    pub const ALL: [Prompt; 7] = [
        Prompt::ExtractEn,
        Prompt::ExtractJa,
        Prompt::SynonymJa,
        Prompt::ClaudeExtractJa,
        Prompt::ClaudeSynonymJa,
        Prompt::GptExtractJa,
        Prompt::Smoke,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Prompt::ExtractEn => "extract_en",
            Prompt::ExtractJa => "extract_ja",
            Prompt::SynonymJa => "synonym_ja",
            Prompt::ClaudeExtractJa => "claude_extract_ja",
            Prompt::ClaudeSynonymJa => "claude_synonym_ja",
            Prompt::GptExtractJa => "gpt_extract_ja",
            Prompt::Smoke => "smoke",
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            Prompt::ExtractEn => concat!(
                "Please extract the technical keywords in Japanese from the following text. \n\n",
                research_statement!(),
                "\n"
            ),
            Prompt::ExtractJa => concat!(
                "以下の文章から技術的な専門用語を日本語で抽出し、keywordというキーだけを持つjson形式でキーワードのjsonのみ出力してください。\n",
                job_posting!(),
                "\n"
            ),
            Prompt::SynonymJa => "機械学習の類義語で具体的な技術キーワードを10つ日本語で提案し、keywordsというキーをもつjson形式でそのキーワードのみ出力してください。\n",
            Prompt::ClaudeExtractJa => concat!(
                "以下から技術キーワード(keywords)を日本語で抽出してください。出力は[keywords]をキーとしてもつjson形式でお願いします。\n",
                job_posting!(),
                "\n"
            ),
            Prompt::ClaudeSynonymJa => "機械学習の類義語で具体的な技術キーワードを日本語で提案し、keywordsというキーをもつjson形式でそのキーワードのみ出力してください。",
            Prompt::GptExtractJa => concat!(
                "以下から技術キーワード(keywords)を日本語でjson形式で抽出してください。\n",
                job_posting!(),
                "\n"
            ),
            Prompt::Smoke => "機械学習について教えてください\n",
        }
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_through_serde() {
        for p in Prompt::ALL {
            let yaml = serde_yaml::to_string(&p).unwrap();
            assert_eq!(yaml.trim(), p.name());
            let back: Prompt = serde_yaml::from_str(p.name()).unwrap();
            assert_eq!(back, p);
        }
    }

    #[test]
    fn test_extraction_prompts_carry_passage() {
        for p in [Prompt::ExtractJa, Prompt::ClaudeExtractJa, Prompt::GptExtractJa] {
            assert!(p.text().contains("音声認識"), "{}", p);
            assert!(p.text().ends_with("期待します\n"), "{}", p);
        }
        assert!(Prompt::ExtractEn.text().contains("医療費"));
    }
}
