use chrono::{DateTime, Utc};

use crate::meet::meet_link;

const FIRE_TEAM: &str = "<!subteam^S01DXD4HKCH>";
const FIRE_CHANNEL: &str = "<#C01DFMK1F4M>";
const ANNOUNCEMENTS_CHANNEL: &str = "<#C024FV14Z>";

/// The incident procedure posted by `/fire`.
pub fn fire_checklist(folder_id: &str, now: DateTime<Utc>) -> String {
    let investigation = meet_link(&format!("fire-investigation-{}", fire_timestamp(now)));

    [
        format!("1. Assemble the {FIRE_TEAM} in the {FIRE_CHANNEL} channel"),
        "2. Designate fire leader, document maintainer, announcements updater".to_owned(),
        format!(
            "3. Fire doc maintainer creates a new doc here: <https://drive.google.com/drive/folders/{folder_id}>"
        ),
        "4. Post link to the fire doc".to_owned(),
        format!(
            "5. If a real fire - announcer posts to the {ANNOUNCEMENTS_CHANNEL} channel \"There is a fire and engineering is investigating, updates will be posted in a thread on this message\""
        ),
        format!("6. Post a link to the fire document in the {ANNOUNCEMENTS_CHANNEL} channel thread"),
        format!("7. Fight! {investigation}\n\n"),
        "8. Use `/firedown` when the fire is out\n".to_owned(),
    ]
    .join("\n")
}

pub fn fire_down_text() -> String {
    format!(
        "1. Ask if there are any cleanup tasks to do\n2. Update the {ANNOUNCEMENTS_CHANNEL}  channel\n3. If applicable, schedule a blameless post mortem\n"
    )
}

fn fire_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d-%H-%M").to_string()
}
