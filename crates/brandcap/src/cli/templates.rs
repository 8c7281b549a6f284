//! The `brandcap templates` command.

use brandcap_core::prompt::TEMPLATES;

pub fn execute() {
    for template in TEMPLATES {
        println!("{}", template.name);
        println!("  style:    {}", template.style);
        println!("  keywords: {}", template.keyword_list());
        println!("  cta:      {}", template.cta);
    }
}
