//! Prompt text. These only assemble instructions; the agent does the work
//! through the tools they name.

use super::types::{BugReportArgs, ProjectPromptArgs};

pub fn create_bug_report(args: &BugReportArgs) -> String {
    let mut text = format!(
        "File a bug report in project {project}.\n\n\
         Summary: {summary}\n",
        project = args.project,
        summary = args.summary.trim(),
    );

    match args.steps.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(steps) => {
            text.push_str("\nSteps to reproduce:\n");
            text.push_str(steps);
            text.push('\n');
        }
        None => text.push_str("\nNo reproduction steps were given; ask for them if they matter.\n"),
    }

    text.push_str(&format!(
        "\nFirst call list_issues with project \"{project}\" and check that the bug is not \
         already reported. If it is new, call create_issue with project \"{project}\", a short \
         title, and a markdown description with sections for summary, steps to reproduce, \
         expected behaviour and actual behaviour. Pick a priority from urgent, high, medium, \
         low or no-priority based on impact. Reply with the new issue identifier.",
        project = args.project,
    ));
    text
}

pub fn triage_issues(args: &ProjectPromptArgs) -> String {
    format!(
        "Triage the open issues of project {project}.\n\n\
         1. Call list_statuses to learn the workflow states.\n\
         2. Call list_issues with project \"{project}\" and review every issue without a \
         priority or still in a backlog state.\n\
         3. For each one, call get_issue when the title alone is not enough.\n\
         4. Set a priority with update_issue and move ready work forward with \
         change_issue_status.\n\n\
         Finish with a short table of issue, old priority, new priority and reason.",
        project = args.project,
    )
}

pub fn project_overview(args: &ProjectPromptArgs) -> String {
    format!(
        "Write an overview of project {project}.\n\n\
         Read the resource tracker://project/{project} or call get_project for its \
         description. Then call list_components, list_milestones and list_issues with \
         project \"{project}\".\n\n\
         Summarize the purpose of the project, its components, upcoming milestones, and \
         how many issues sit in each status. Call out urgent or high priority issues by \
         identifier.",
        project = args.project,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bug(steps: Option<&str>) -> BugReportArgs {
        BugReportArgs {
            project: "PROJ".into(),
            summary: "Login button does nothing".into(),
            steps: steps.map(String::from),
        }
    }

    #[test]
    fn bug_report_names_project_and_tool() {
        let text = create_bug_report(&bug(Some("1. open page\n2. click login")));
        assert!(text.contains("project PROJ"));
        assert!(text.contains("Login button does nothing"));
        assert!(text.contains("2. click login"));
        assert!(text.contains("create_issue"));
    }

    #[test]
    fn bug_report_without_steps_asks_for_them() {
        let text = create_bug_report(&bug(Some("   ")));
        assert!(text.contains("No reproduction steps were given"));
        assert!(!text.contains("Steps to reproduce:"));
    }

    #[test]
    fn project_prompts_reference_the_project() {
        let args = ProjectPromptArgs {
            project: "OPS".into(),
        };
        assert!(triage_issues(&args).contains("list_issues with project \"OPS\""));
        assert!(project_overview(&args).contains("tracker://project/OPS"));
    }
}
