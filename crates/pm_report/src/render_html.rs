//! HTML report rendering via `minijinja` — a real dependency of the
//! teacher's own `vm_report` crate. A single embedded template covers
//! the whole report; `render_html` builds the `minijinja::context!` and
//! renders it, with no filesystem access and no network calls.

use minijinja::{context, Environment};

use crate::model::ReportModel;

const TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{ cover.title }}</title>
</head>
<body>
<h1>{{ cover.title }}</h1>
<p>Match group: {{ cover.match_group }} &middot; Objective: {{ cover.objective_type }} &middot; Seed: {{ cover.seed }}</p>
<p>Configuration: <code>{{ cover.config_id }}</code></p>

<h2>Summary</h2>
<ul>
<li>Papers: {{ summary.paper_count }}</li>
<li>Reviewers: {{ summary.reviewer_count }}</li>
<li>Total assignments: {{ summary.total_assignments }}</li>
<li>Constraint warnings: {{ summary.constraint_warning_count }}</li>
</ul>

<h2>Assignments</h2>
<table border="1" cellpadding="4">
<tr><th>Paper</th><th>Assigned</th><th>Alternates</th></tr>
{% for row in papers %}
<tr>
  <td>{{ row.paper }}</td>
  <td>{% for a in row.assigned %}{{ a.reviewer }} ({{ "%.3f"|format(a.score) }}){% if not loop.last %}, {% endif %}{% endfor %}</td>
  <td>{% for a in row.alternates %}{{ a.reviewer }} ({{ "%.3f"|format(a.score) }}){% if not loop.last %}, {% endif %}{% endfor %}</td>
</tr>
{% endfor %}
</table>

{% if constraint_warnings %}
<h2>Constraint warnings</h2>
<ul>
{% for w in constraint_warnings %}
<li>{{ w.paper }} / {{ w.reviewer }}: lock overrode a prior conflict or veto</li>
{% endfor %}
</ul>
{% endif %}
</body>
</html>
"#;

pub fn render_html(model: &ReportModel) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template("report.html", TEMPLATE)?;
    let tmpl = env.get_template("report.html")?;

    let papers: Vec<_> = model
        .papers
        .iter()
        .map(|row| {
            context! {
                paper => row.paper.to_string(),
                assigned => row.assigned.iter().map(|(r, s)| context!{ reviewer => r.to_string(), score => *s }).collect::<Vec<_>>(),
                alternates => row.alternates.iter().map(|(r, s)| context!{ reviewer => r.to_string(), score => *s }).collect::<Vec<_>>(),
            }
        })
        .collect();

    let warnings: Vec<_> = model
        .constraint_warnings
        .iter()
        .map(|(p, r)| context! { paper => p.to_string(), reviewer => r.to_string() })
        .collect();

    tmpl.render(context! {
        cover => context! {
            title => model.cover.title.clone(),
            match_group => model.cover.match_group.clone(),
            objective_type => format!("{:?}", model.cover.objective_type),
            config_id => model.cover.config_id.clone(),
            seed => model.cover.seed,
        },
        summary => context! {
            paper_count => model.summary.paper_count,
            reviewer_count => model.summary.reviewer_count,
            total_assignments => model.summary.total_assignments,
            constraint_warning_count => model.summary.constraint_warning_count,
        },
        papers => papers,
        constraint_warnings => warnings,
    })
}
